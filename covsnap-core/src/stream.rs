use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
};

use crate::error::ExportError;

/// An open artifact. The file is flushed to disk and closed exactly once,
/// either through [`OutputStream::close`] or when the guard is dropped.
pub(crate) struct OutputStream {
    file: Option<File>,
    path: PathBuf,
}

impl OutputStream {
    /// Opens `path` for writing, truncating it unless `append` is set.
    pub fn open(path: &Path, append: bool) -> io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path)?;
        Ok(OutputStream {
            file: Some(file),
            path: path.to_owned(),
        })
    }

    pub fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        match &mut self.file {
            Some(file) => file.write_all(data),
            None => Err(io::Error::other("stream already closed")),
        }
    }

    /// Closes the stream, logging a failure instead of returning it.
    pub fn close(mut self) {
        self.release();
    }

    fn release(&mut self) {
        let Some(mut file) = self.file.take() else {
            return;
        };
        if let Err(source) = file.flush().and_then(|()| file.sync_all()) {
            log::error!(
                "{}",
                ExportError::StreamCloseFailed {
                    path: self.path.clone(),
                    source,
                }
            );
        }
    }
}

impl Drop for OutputStream {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_log;
    use log::Level;
    use mktemp::Temp;
    use std::fs;

    #[test]
    fn test_truncate_and_append() {
        let tmp = Temp::new_dir().unwrap();
        let path = tmp.as_path().join("out.ec");

        let mut stream = OutputStream::open(&path, false).unwrap();
        stream.write_all(b"first").unwrap();
        stream.close();
        assert_eq!(fs::read(&path).unwrap(), b"first");

        let mut stream = OutputStream::open(&path, true).unwrap();
        stream.write_all(b"+second").unwrap();
        drop(stream);
        assert_eq!(fs::read(&path).unwrap(), b"first+second");

        let mut stream = OutputStream::open(&path, false).unwrap();
        stream.write_all(b"third").unwrap();
        stream.close();
        assert_eq!(fs::read(&path).unwrap(), b"third");
    }

    #[test]
    fn test_write_after_release() {
        let tmp = Temp::new_dir().unwrap();
        let mut stream = OutputStream::open(&tmp.as_path().join("out.ec"), false).unwrap();
        stream.release();
        assert!(stream.write_all(b"late").is_err());
    }

    #[test]
    fn test_open_missing_dir() {
        let tmp = Temp::new_dir().unwrap();
        let path = tmp.as_path().join("missing").join("out.ec");
        assert!(OutputStream::open(&path, false).is_err());
    }

    #[test]
    fn test_close_failure_is_logged_once() {
        // fsync is not supported on character devices.
        let stream = OutputStream::open(Path::new("/dev/full"), false).unwrap();
        let ((), records) = test_log::capture(|| stream.close());

        let errors = test_log::at(&records, Level::Error);
        assert_eq!(errors.len(), 1, "{records:?}");
        assert!(
            errors[0].starts_with("Stream close failed for /dev/full"),
            "{}",
            errors[0]
        );
    }

    #[test]
    fn test_clean_close_logs_nothing() {
        let tmp = Temp::new_dir().unwrap();
        let mut stream = OutputStream::open(&tmp.as_path().join("out.ec"), false).unwrap();
        stream.write_all(b"data").unwrap();
        let ((), records) = test_log::capture(|| drop(stream));
        assert!(records.is_empty(), "{records:?}");
    }
}
