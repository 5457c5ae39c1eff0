//! Envelope model and control messages.

mod control;
mod envelope;

pub use control::{
    BroadcastCtl, KickCtl, PushCtl, ResponseCtl, BROADCAST_FUNC, KICK_FUNC, PUSH_FUNC,
    RESPONSE_FUNC,
};
pub use envelope::{
    await_reply, ActorPath, ChanReply, ClusterResponder, Envelope, Payload, ReplyHandle,
    ReplyReceiver, RpcResponse,
};
