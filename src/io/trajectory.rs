use crate::error::Result;
use nalgebra::Vector3;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Receives particle coordinates on trajectory-output steps
pub trait TrajectorySink {
    /// `step` is 1-based; `coordinates` reflect the state after that step's move
    fn write_frame(&mut self, step: usize, coordinates: &[Vector3<f64>]) -> Result<()>;

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Discards every frame
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTrajectory;

impl TrajectorySink for NullTrajectory {
    fn write_frame(&mut self, _step: usize, _coordinates: &[Vector3<f64>]) -> Result<()> {
        Ok(())
    }
}

/// Plain-text frames: a `Step: <n>` header, then one `x y z` line per particle
pub struct TextTrajectoryWriter<W: Write> {
    writer: W,
    frames: usize,
}

impl<W: Write> TextTrajectoryWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, frames: 0 }
    }

    pub fn frames_written(&self) -> usize {
        self.frames
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl TextTrajectoryWriter<BufWriter<File>> {
    /// Create (truncating) a trajectory file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> TrajectorySink for TextTrajectoryWriter<W> {
    fn write_frame(&mut self, step: usize, coordinates: &[Vector3<f64>]) -> Result<()> {
        writeln!(self.writer, "Step: {}", step)?;
        for pos in coordinates {
            writeln!(self.writer, "{} {} {}", pos.x, pos.y, pos.z)?;
        }
        self.frames += 1;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_frame_layout() {
        let mut sink = TextTrajectoryWriter::new(Vec::new());
        let coords = vec![Vector3::new(0.5, -1.0, 2.25), Vector3::new(0.0, 0.0, -0.125)];
        sink.write_frame(10, &coords).unwrap();
        sink.write_frame(20, &coords[..1]).unwrap();
        assert_eq!(sink.frames_written(), 2);

        let text = String::from_utf8(sink.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec!["Step: 10", "0.5 -1 2.25", "0 0 -0.125", "Step: 20", "0.5 -1 2.25"]
        );
    }
}
