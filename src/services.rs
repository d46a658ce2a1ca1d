use std::thread::JoinHandle;

use anyhow::{anyhow, Result};
use log::error;
use upload::UploadService;

use crate::config::AppConfig;

pub mod clipboard;
pub mod upload;

/// Holds instanciated services.
pub struct Services {
    pub upload: Box<dyn UploadService>,
}

impl Services {
    /// Create a new `Services` from the services specified in the given `AppConfig`.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut services = Self {
            upload: config.upload_service.create_service(),
        };

        services.upload.init()?;

        Ok(services)
    }
}

impl Drop for Services {
    fn drop(&mut self) {
        if let Err(e) = self.upload.terminate() {
            error!("Failed to terminate upload service: {e:#}");
        }
    }
}

/// A job being performed by a service on a background thread. May or may not be finished.
pub struct ServiceJob<T> {
    handle: Option<JoinHandle<T>>,
}

impl<T: Send + 'static> ServiceJob<T> {
    pub fn new<F: FnOnce() -> T + Send + 'static>(f: F) -> Self {
        std::thread::spawn(f).into()
    }
}

impl<T> ServiceJob<T> {
    /// Get the return value of this `ServiceJob` if it was finished.
    ///
    /// - Returns `Err` if the job panicked, or has already finished and its return value was taken previously;
    /// - Returns `Ok(None)` if the job has not finished yet;
    /// - Returns `Ok(Some(T))` if the job has finished.
    pub fn try_wait(&mut self) -> Result<Option<T>> {
        match self.handle.take() {
            None => Err(anyhow!("job already finished")),
            Some(handle) if handle.is_finished() => join(handle).map(Some),
            Some(handle) => {
                self.handle = Some(handle);
                Ok(None)
            }
        }
    }

    /// Wait for the job to finish and return its return value.
    ///
    /// - Returns `Err` if the job panicked, or has already finished (eg. by calling `try_wait()`) and its return value was taken previously;
    /// - Returns `Ok(T)` if the job has finished.
    pub fn wait(self) -> Result<T> {
        match self.handle {
            None => Err(anyhow!("job already finished")),
            Some(handle) => join(handle),
        }
    }
}

fn join<T>(handle: JoinHandle<T>) -> Result<T> {
    handle
        .join()
        .map_err(|_| anyhow!("service job panicked"))
}

impl<T> From<JoinHandle<T>> for ServiceJob<T> {
    fn from(handle: JoinHandle<T>) -> Self {
        ServiceJob {
            handle: Some(handle),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{sync::mpsc, time::Duration};

    use super::*;

    #[test]
    fn try_wait_returns_none_until_finished() {
        let (tx, rx) = mpsc::channel::<()>();
        let mut job = ServiceJob::new(move || {
            rx.recv().unwrap();
            42
        });

        assert!(job.try_wait().unwrap().is_none());
        tx.send(()).unwrap();

        let value = loop {
            if let Some(value) = job.try_wait().unwrap() {
                break value;
            }
            std::thread::sleep(Duration::from_millis(5));
        };
        assert_eq!(value, 42);
        assert!(job.try_wait().is_err());
    }

    #[test]
    fn wait_returns_value() {
        let job = ServiceJob::new(|| "done");
        assert_eq!(job.wait().unwrap(), "done");
    }

    #[test]
    fn panicking_job_is_an_error() {
        let job: ServiceJob<()> = ServiceJob::new(|| panic!("boom"));
        assert!(job.wait().is_err());
    }
}
