//! Checkpoint callback for saving model state periodically

use std::cell::RefCell;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Serialize;

use super::traits::{dispatch, Bindings, Callback, Method};
use crate::config::SaverConfig;
use crate::error::{Error, Result};
use crate::logging::{self, Logger};
use crate::train::event::{EventData, TrainEvent};

/// Checkpoint callback serializing a shared model as JSON
///
/// On `EpochEnd`, if `epoch % interval == 0`, writes
/// `{directory}/{basename}.{epoch}.{extension}`. A failed write is logged as a
/// warning and training continues.
pub struct Saver<M> {
    name: String,
    model: Rc<RefCell<M>>,
    basename: String,
    directory: PathBuf,
    extension: String,
    interval: usize,
    saved: Vec<PathBuf>,
    logger: Rc<dyn Logger>,
    bindings: Bindings<Self>,
}

impl<M: Serialize> Saver<M> {
    /// Default callback name
    pub const NAME: &'static str = "saver";

    /// Save `model` every epoch into the current directory
    pub fn new(model: Rc<RefCell<M>>, basename: impl Into<String>) -> Self {
        Self {
            name: Self::NAME.to_string(),
            model,
            basename: basename.into(),
            directory: PathBuf::from("."),
            extension: "json".to_string(),
            interval: 1,
            saved: Vec::new(),
            logger: logging::noop(),
            bindings: Bindings::new().with(TrainEvent::EpochEnd, Self::on_epoch_end),
        }
    }

    /// Saver described by a `saver:` config section
    pub fn from_config(model: Rc<RefCell<M>>, config: &SaverConfig) -> Self {
        Self::new(model, config.basename.clone())
            .with_directory(&config.directory)
            .with_extension(config.extension.clone())
            .with_interval(config.interval)
    }

    /// Output directory (created on first save)
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }

    /// File extension, without the dot
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    /// Save every `interval` epochs (at least 1)
    pub fn with_interval(mut self, interval: usize) -> Self {
        self.interval = interval.max(1);
        self
    }

    /// Callback name, for running several savers side by side
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Route save messages through `logger`
    pub fn with_logger(mut self, logger: Rc<dyn Logger>) -> Self {
        self.logger = logger;
        self
    }

    /// Bind (or replace) a handler
    pub fn implement(&mut self, event: TrainEvent, method: Method<Self>) {
        self.bindings.implement(event, method);
    }

    /// Checkpoint path for `epoch`
    pub fn checkpoint_path(&self, epoch: usize) -> PathBuf {
        self.directory.join(format!("{}.{epoch}.{}", self.basename, self.extension))
    }

    /// Paths written so far, oldest first
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }

    /// Write the checkpoint for `epoch` now
    pub fn save(&mut self, epoch: usize) -> Result<PathBuf> {
        let path = self.checkpoint_path(epoch);
        self.logger.info(&format!("saving the model to {} ...", path.display()));
        fs::create_dir_all(&self.directory)
            .map_err(|e| Error::io(format!("creating {}", self.directory.display()), e))?;
        write_json(&path, &*self.model.borrow())?;
        self.saved.push(path.clone());
        Ok(path)
    }

    fn on_epoch_end(&mut self, data: &mut EventData<'_>) {
        let Some(epoch) = data.epoch() else {
            return;
        };
        if epoch % self.interval != 0 {
            return;
        }
        if let Err(e) = self.save(epoch) {
            self.logger.warn(&format!("checkpoint for epoch {epoch} not written: {e}"));
        }
    }
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file =
        File::create(path).map_err(|e| Error::io(format!("creating {}", path.display()), e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| Error::io(format!("writing {}", path.display()), e))
}

impl<M> std::fmt::Debug for Saver<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Saver")
            .field("name", &self.name)
            .field("basename", &self.basename)
            .field("directory", &self.directory)
            .field("interval", &self.interval)
            .field("saved", &self.saved.len())
            .finish()
    }
}

impl<M: Serialize> Callback for Saver<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn handles(&self, event: TrainEvent) -> bool {
        self.bindings.contains(event)
    }

    fn on_event(&mut self, event: TrainEvent, data: &mut EventData<'_>) {
        dispatch(self, |cb| &cb.bindings, event, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::testing::RecordingLogger;
    use crate::train::event::EpochContext;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Weights {
        w: Vec<f32>,
    }

    fn model() -> Rc<RefCell<Weights>> {
        Rc::new(RefCell::new(Weights { w: vec![0.5, -1.0] }))
    }

    fn end_epoch<M: Serialize>(saver: &mut Saver<M>, epoch: usize) {
        let mut ctx = EpochContext { epoch, size: 8 };
        saver.on_event(TrainEvent::EpochEnd, &mut EventData::Epoch(&mut ctx));
    }

    #[test]
    fn test_checkpoint_path() {
        let saver = Saver::new(model(), "mlp").with_directory("/tmp/ckpt");
        assert_eq!(saver.checkpoint_path(5), PathBuf::from("/tmp/ckpt/mlp.5.json"));
    }

    #[test]
    fn test_saver_respects_interval() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut saver =
            Saver::new(model(), "mlp").with_directory(temp_dir.path()).with_interval(2);

        for epoch in 1..=5 {
            end_epoch(&mut saver, epoch);
        }

        assert_eq!(
            saver.saved(),
            &[temp_dir.path().join("mlp.2.json"), temp_dir.path().join("mlp.4.json")]
        );
    }

    #[test]
    fn test_saver_writes_current_model() {
        let temp_dir = tempfile::tempdir().unwrap();
        let shared = model();
        let mut saver = Saver::new(Rc::clone(&shared), "mlp").with_directory(temp_dir.path());

        shared.borrow_mut().w[0] = 2.0;
        end_epoch(&mut saver, 1);

        let text = fs::read_to_string(temp_dir.path().join("mlp.1.json")).unwrap();
        let loaded: Weights = serde_json::from_str(&text).unwrap();
        assert_eq!(loaded, Weights { w: vec![2.0, -1.0] });
    }

    #[test]
    fn test_saver_creates_directory() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested = temp_dir.path().join("a").join("b");
        let mut saver = Saver::new(model(), "m").with_directory(&nested).with_extension("ckpt");
        let path = saver.save(3).unwrap();
        assert_eq!(path, nested.join("m.3.ckpt"));
        assert!(path.exists());
    }

    #[test]
    fn test_saver_write_failure_is_logged() {
        let temp_dir = tempfile::tempdir().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, "x").unwrap();

        let logger = Rc::new(RecordingLogger::default());
        let mut saver = Saver::new(model(), "m")
            .with_directory(blocker.join("sub"))
            .with_logger(logger.clone());
        end_epoch(&mut saver, 1);

        assert!(saver.saved().is_empty());
        assert!(logger.contains("W checkpoint for epoch 1 not written"));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_failed_flush_is_an_error() {
        // /dev/full accepts open and buffered writes but fails the flush
        let err = write_json(Path::new("/dev/full"), &*model().borrow()).unwrap_err();
        assert!(matches!(err, Error::Io { .. } | Error::Serialization(_)), "{err}");
    }

    #[test]
    fn test_zero_interval_saves_every_epoch() {
        let temp_dir = tempfile::tempdir().unwrap();
        let mut saver =
            Saver::new(model(), "m").with_directory(temp_dir.path()).with_interval(0);
        end_epoch(&mut saver, 1);
        end_epoch(&mut saver, 2);
        assert_eq!(saver.saved().len(), 2);
    }

    #[test]
    fn test_from_config() {
        let config = SaverConfig {
            basename: "net".to_string(),
            directory: PathBuf::from("out"),
            interval: 3,
            extension: "json".to_string(),
        };
        let saver = Saver::from_config(model(), &config);
        assert_eq!(saver.checkpoint_path(6), PathBuf::from("out/net.6.json"));
        assert_eq!(saver.name(), "saver");
    }
}
