use alloy_primitives::Log;
use alloy_sol_types::{sol, SolEvent};

sol! {
    #[derive(Debug)]
    event MessageSent(bytes message);
}

/// Tries to decode the provided log into the type T.
pub fn try_decode_log<T: SolEvent>(log: &Log) -> Option<Log<T>> {
    T::decode_log(log).ok()
}
