use std::any::Any;

use diesel::SqliteConnection;
use log::{debug, error};
use tokio::sync::{mpsc, oneshot};

use super::{DbConnection, DbPool};
use crate::errors::StorageError;
use flipledger_core::errors::{DatabaseError, Error, Result};

/// Capacity of the job queue in front of the writer.
const WRITE_QUEUE_CAPACITY: usize = 1024;

type Job<T> = Box<dyn FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static>;
type Erased = Box<dyn Any + Send + 'static>;

/// Handle for sending write jobs to the single database writer.
///
/// Cloned freely; every clone feeds the same queue, so writes from concurrent
/// sync units are serialized on one connection.
#[derive(Clone)]
pub struct WriteHandle {
    tx: mpsc::Sender<(Job<Erased>, oneshot::Sender<Result<Erased>>)>,
}

impl WriteHandle {
    /// Run `job` inside an immediate transaction on the writer's connection.
    pub async fn exec<F, T>(&self, job: F) -> Result<T>
    where
        F: FnOnce(&mut SqliteConnection) -> Result<T> + Send + 'static,
        T: Send + 'static + Any,
    {
        let (ret_tx, ret_rx) = oneshot::channel();

        self.tx
            .send((
                Box::new(move |c| job(c).map(|v| Box::new(v) as Erased)),
                ret_tx,
            ))
            .await
            .map_err(|_| writer_gone("Writer actor stopped accepting jobs"))?;

        let boxed = ret_rx
            .await
            .map_err(|_| writer_gone("Writer actor dropped the job without a result"))??;

        boxed
            .downcast::<T>()
            .map(|v| *v)
            .map_err(|_| {
                Error::Database(DatabaseError::Internal(
                    "Writer result had an unexpected type".to_string(),
                ))
            })
    }
}

fn writer_gone(message: &str) -> Error {
    Error::Database(DatabaseError::ConnectionFailed(message.to_string()))
}

/// Spawn the writer task. It takes a pooled connection on the first job and
/// keeps it; when none can be had, that job fails and the next one retries.
/// The task stops when every [`WriteHandle`] is dropped.
pub fn spawn_writer(pool: DbPool) -> WriteHandle {
    let (tx, mut rx) =
        mpsc::channel::<(Job<Erased>, oneshot::Sender<Result<Erased>>)>(WRITE_QUEUE_CAPACITY);

    tokio::spawn(async move {
        let mut held: Option<DbConnection> = None;

        while let Some((job, reply_tx)) = rx.recv().await {
            let conn = match held.as_mut() {
                Some(conn) => conn,
                None => match pool.get() {
                    Ok(conn) => held.insert(conn),
                    Err(e) => {
                        error!("Writer actor could not get a database connection: {}", e);
                        let _ = reply_tx.send(Err(writer_gone(&format!(
                            "No database connection for writes: {}",
                            e
                        ))));
                        continue;
                    }
                },
            };

            let result: Result<Erased> = conn
                .immediate_transaction::<_, StorageError, _>(|c| job(c).map_err(StorageError::from))
                .map_err(|e: StorageError| e.into());

            // The caller may have gone away (cancelled request); nothing to report.
            let _ = reply_tx.send(result);
        }
        debug!("Writer actor stopped");
    });

    WriteHandle { tx }
}
