use crate::error::Result;
use crate::events::{RawInputEvent, RECORD_SIZE};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, BufReader};
use tracing::info;

use super::r#trait::{classify_read_error, DeviceSource, Polled};

/// Источник из потока записей `struct input_event`, например захвата
/// `cat /dev/input/eventN > capture.bin`
pub struct RecordSource<R> {
    reader: R,
    name: String,
    records: u64,
}

impl RecordSource<BufReader<File>> {
    pub async fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).await?;
        info!("Воспроизведение событий из {:?}", path);
        Ok(Self::new(BufReader::new(file), path.display().to_string()))
    }
}

impl<R> RecordSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    pub fn new(reader: R, name: impl Into<String>) -> Self {
        Self {
            reader,
            name: name.into(),
            records: 0,
        }
    }
}

#[async_trait::async_trait]
impl<R> DeviceSource for RecordSource<R>
where
    R: AsyncRead + Unpin + Send,
{
    async fn next_event(&mut self) -> Result<Polled> {
        let mut record = [0u8; RECORD_SIZE];

        match self.reader.read_exact(&mut record).await {
            Ok(_) => {
                self.records += 1;
                Ok(Polled::Event(RawInputEvent::decode(&record)))
            }
            // неполная запись в конце тоже считается концом потока
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                info!("{}: поток закончился после {} записей", self.name, self.records);
                Ok(Polled::Closed)
            }
            Err(e) => classify_read_error(e),
        }
    }

    fn describe(&self) -> String {
        format!("записи из {}", self.name)
    }
}
