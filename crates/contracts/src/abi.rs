//! ABI definitions of the CCTP calls and events used by the bridge.

#[allow(missing_docs)]
pub mod calls;
#[allow(missing_docs)]
pub mod logs;
