use std::{
    io,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    thread,
};

use log::{debug, info};

/// Stop request shared between one writer and the training loop.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Cancels the returned token once a line is read from stdin.
pub fn on_enter() -> CancelToken {
    let token = CancelToken::new();
    let writer = token.clone();
    thread::spawn(move || {
        let mut line = String::new();
        match io::stdin().read_line(&mut line) {
            Ok(n) if n > 0 => {
                info!("Ending...");
                writer.cancel();
            }
            _ => debug!("stdin closed, training runs to completion"),
        }
    });
    token
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn clones_share_state() {
        let token = CancelToken::new();
        let writer = token.clone();
        assert!(!token.is_cancelled());
        writer.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn cancel_crosses_threads() {
        let token = CancelToken::new();
        let writer = token.clone();
        thread::spawn(move || writer.cancel()).join().unwrap();
        assert!(token.is_cancelled());
    }
}
