use std::sync::Arc;

use crate::inference::InferenceTransport;
use crate::relay::Relay;
use crate::telegram::ChatSender;

pub struct HandlerState<T, S: ?Sized> {
    pub relay: Arc<Relay<T>>,

    pub sender: Arc<S>,

    /// Max prompt characters taken from an incoming message.
    pub prompt_limit: usize,
}

impl<T, S> HandlerState<T, S>
where
    T: InferenceTransport + 'static,
    S: ChatSender + ?Sized + 'static,
{
    pub fn new(relay: Arc<Relay<T>>, sender: Arc<S>, prompt_limit: usize) -> Self {
        Self {
            relay,
            sender,
            prompt_limit,
        }
    }
}

impl<T, S: ?Sized> Clone for HandlerState<T, S> {
    fn clone(&self) -> Self {
        Self {
            relay: Arc::clone(&self.relay),
            sender: Arc::clone(&self.sender),
            prompt_limit: self.prompt_limit,
        }
    }
}
