//! Acknowledgement channel for asynchronous appends.

use crate::error::{StoreError, StoreResult};
use crossbeam::channel::{self, Receiver, Sender, TryRecvError};

/// The backend half of a completion.
///
/// Consumed by [`CompletionSender::complete`]. Dropping it without completing
/// resolves the paired [`Completion`] to [`StoreError::Abandoned`].
#[derive(Debug)]
pub struct CompletionSender {
    token: u64,
    tx: Sender<StoreResult<()>>,
}

impl CompletionSender {
    /// Returns the token of the operation being acknowledged.
    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Delivers the result of the operation.
    ///
    /// A completion whose owner has already let it go is silently skipped.
    pub fn complete(self, result: StoreResult<()>) {
        let _ = self.tx.send(result);
    }
}

/// The issuer's half of an asynchronous operation.
///
/// Each completion carries a token unique within its store and resolves
/// exactly once.
#[derive(Debug)]
pub struct Completion {
    token: u64,
    rx: Receiver<StoreResult<()>>,
    result: Option<StoreResult<()>>,
}

impl Completion {
    /// Creates a connected sender/completion pair for `token`.
    #[must_use]
    pub fn pair(token: u64) -> (CompletionSender, Self) {
        let (tx, rx) = channel::bounded(1);
        (
            CompletionSender { token, tx },
            Self {
                token,
                rx,
                result: None,
            },
        )
    }

    /// Creates a completion that has already resolved.
    ///
    /// Used by stores that apply appends inline.
    #[must_use]
    pub fn ready(token: u64, result: StoreResult<()>) -> Self {
        let (sender, completion) = Self::pair(token);
        sender.complete(result);
        completion
    }

    /// Returns the completion token.
    #[must_use]
    pub fn token(&self) -> u64 {
        self.token
    }

    /// Returns true once the backend has acknowledged the operation.
    ///
    /// Never blocks.
    pub fn is_complete(&mut self) -> bool {
        if self.result.is_some() {
            return true;
        }
        match self.rx.try_recv() {
            Ok(result) => {
                self.result = Some(result);
                true
            }
            Err(TryRecvError::Empty) => false,
            Err(TryRecvError::Disconnected) => {
                self.result = Some(Err(StoreError::Abandoned { token: self.token }));
                true
            }
        }
    }

    /// Blocks until the operation is acknowledged and returns its result.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, or `Abandoned` if the backend dropped the
    /// operation.
    pub fn wait(self) -> StoreResult<()> {
        if let Some(result) = self.result {
            return result;
        }
        match self.rx.recv() {
            Ok(result) => result,
            Err(_) => Err(StoreError::Abandoned { token: self.token }),
        }
    }
}
