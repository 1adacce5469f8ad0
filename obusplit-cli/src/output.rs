use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use av1_split::FrameSink;
use tracing::info;

/// Writes each completed frame to `<dir>/frame-<N>.obu`.
pub struct DirFrameSink {
    dir: PathBuf,
}

impl DirFrameSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn frame_path(&self, index: u64) -> PathBuf {
        self.dir.join(format!("frame-{index}.obu"))
    }
}

impl FrameSink for DirFrameSink {
    fn write_frame(&mut self, index: u64, frame: &[u8]) -> io::Result<()> {
        let path = self.frame_path(index);
        let mut file = File::create(&path)?;
        file.write_all(frame)?;
        info!("wrote {} ({} bytes)", path.display(), frame.len());
        Ok(())
    }
}
