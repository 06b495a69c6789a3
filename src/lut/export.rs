//! Flat text listing of a LUT for hardware-description toolchains.
//!
//! One assignment per line, X table then Y table for each cell, cells in
//! row-major (x, y) order:
//!
//! ```text
//! Fmatrix[0][0]=63;
//! Gmatrix[0][0]=63;
//! Fmatrix[0][1]=63;
//! ...
//! ```

use std::io::Write;

use super::Lut;
use crate::error::Result;

pub fn write_verilog<W: Write>(lut: &Lut, mut writer: W) -> Result<()> {
    let n = lut.lattice().n;
    for x in 0..n {
        for y in 0..n {
            let (f, g) = lut.get(x, y);
            writeln!(writer, "Fmatrix[{}][{}]={};", x, y, f)?;
            writeln!(writer, "Gmatrix[{}][{}]={};", x, y, g)?;
        }
    }
    writer.flush()?;
    Ok(())
}

pub fn to_verilog_string(lut: &Lut) -> Result<String> {
    let mut buf = Vec::new();
    write_verilog(lut, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}
