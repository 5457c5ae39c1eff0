//! End-to-end tests for the three calling conventions.

use agentry::codes;
use agentry::error::StatusError;
use agentry::invoke::{invoke_local, invoke_remote, LocalHandlers, RemoteHandlers};
use agentry::messaging::{
    ActorPath, ChanReply, ClusterResponder, Envelope, Payload, ResponseCtl, RpcResponse,
    RESPONSE_FUNC,
};
use agentry::protocol::Caller;
use agentry::serialization::{JsonSerializer, Serializer};
use agentry::session::Session;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct PlayerInfo {
    uid: i64,
    name: String,
    level: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct GetPlayerReq {
    name: String,
}

struct PlayerActor {
    level: u32,
    ticks: u32,
}

/// Records every control message sent through actor addressing.
#[derive(Default)]
struct RecordingCaller {
    calls: Mutex<Vec<(ActorPath, String, Payload)>>,
}

impl Caller for RecordingCaller {
    fn call(&self, target: &ActorPath, func_name: &str, args: Payload) {
        self.calls
            .lock()
            .push((target.clone(), func_name.to_string(), args));
    }
}

impl RecordingCaller {
    fn take_responses(&self) -> Vec<(ActorPath, ResponseCtl)> {
        self.calls
            .lock()
            .drain(..)
            .map(|(target, func, args)| {
                assert_eq!(func, RESPONSE_FUNC);
                let Payload::Value(value) = args else {
                    panic!("control message should be an in-process value");
                };
                (target, *value.downcast::<ResponseCtl>().unwrap())
            })
            .collect()
    }

    fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }
}

/// One-shot responder standing in for the cluster transport.
struct RecordingResponder {
    sent: Arc<Mutex<Vec<Vec<u8>>>>,
}

impl ClusterResponder for RecordingResponder {
    fn respond(self: Box<Self>, bytes: Vec<u8>) {
        self.sent.lock().push(bytes);
    }
}

fn responder() -> (Box<RecordingResponder>, Arc<Mutex<Vec<Vec<u8>>>>) {
    let sent = Arc::new(Mutex::new(Vec::new()));
    (
        Box::new(RecordingResponder { sent: sent.clone() }),
        sent,
    )
}

fn session_with_mid(mid: u32) -> Session {
    let mut session = Session::new(ActorPath::new("gate.agent.1"));
    session.mid = mid;
    session
}

fn request_envelope(func_name: &str, args: Payload, session: Session) -> Envelope {
    Envelope::new("gate.agent.1", "game.player.1", func_name, args).with_session(session)
}

fn local_handlers() -> LocalHandlers<PlayerActor, JsonSerializer> {
    let mut handlers = LocalHandlers::new(JsonSerializer::new());
    handlers
        .register_request(
            "getPlayer",
            |actor: &mut PlayerActor, session, req: GetPlayerReq| {
                Ok(Some(PlayerInfo {
                    uid: session.uid,
                    name: req.name,
                    level: actor.level,
                }))
            },
        )
        .unwrap();
    handlers
}

#[test]
fn test_session_request_success_response() {
    // Scenario A: handler returns (playerInfo, nil); exactly one response
    // control message with the request's mid, code OK and the marshaled
    // result.
    let serializer = JsonSerializer::new();
    let handlers = local_handlers();
    let caller = RecordingCaller::default();
    let mut actor = PlayerActor { level: 9, ticks: 0 };

    let mut session = session_with_mid(7);
    session.bind(1001);
    let args = serializer
        .serialize(&GetPlayerReq {
            name: "nrgi".to_string(),
        })
        .unwrap();

    invoke_local(
        &mut actor,
        &handlers,
        &caller,
        request_envelope("getPlayer", Payload::Bytes(args), session),
    );

    let responses = caller.take_responses();
    assert_eq!(responses.len(), 1);

    let (target, ctl) = &responses[0];
    assert_eq!(target.as_str(), "gate.agent.1");
    assert_eq!(ctl.mid, 7);
    assert_eq!(ctl.code, codes::OK);
    assert!(ctl.message.is_empty());

    let info: PlayerInfo = serializer.deserialize(&ctl.data).unwrap();
    assert_eq!(
        info,
        PlayerInfo {
            uid: 1001,
            name: "nrgi".to_string(),
            level: 9,
        }
    );
}

#[test]
fn test_session_request_error_response() {
    // Scenario B: handler returns a structured error; the response carries
    // its code and message verbatim and no payload.
    let mut handlers = LocalHandlers::<PlayerActor, _>::new(JsonSerializer::new());
    handlers
        .register_request(
            "getPlayer",
            |_actor, _session, _req: GetPlayerReq| -> Result<Option<PlayerInfo>, StatusError> {
                Err(StatusError::new(400, "bad"))
            },
        )
        .unwrap();

    let serializer = JsonSerializer::new();
    let caller = RecordingCaller::default();
    let mut actor = PlayerActor { level: 1, ticks: 0 };
    let args = serializer
        .serialize(&GetPlayerReq {
            name: "x".to_string(),
        })
        .unwrap();

    invoke_local(
        &mut actor,
        &handlers,
        &caller,
        request_envelope("getPlayer", Payload::Bytes(args), session_with_mid(3)),
    );

    let responses = caller.take_responses();
    assert_eq!(responses.len(), 1);

    let ctl = &responses[0].1;
    assert_eq!(ctl.mid, 3);
    assert_eq!(ctl.code, 400);
    assert_eq!(ctl.message, "bad");
    assert!(ctl.data.is_empty());
}

#[test]
fn test_session_request_null_reply_produces_nothing() {
    // (nil, nil) is a contract violation: logged, no response delivered.
    let mut handlers = LocalHandlers::<PlayerActor, _>::new(JsonSerializer::new());
    handlers
        .register_request(
            "getPlayer",
            |_actor, _session, _req: GetPlayerReq| -> Result<Option<PlayerInfo>, StatusError> {
                Ok(None)
            },
        )
        .unwrap();

    let serializer = JsonSerializer::new();
    let caller = RecordingCaller::default();
    let mut actor = PlayerActor { level: 1, ticks: 0 };
    let args = serializer
        .serialize(&GetPlayerReq {
            name: "x".to_string(),
        })
        .unwrap();

    invoke_local(
        &mut actor,
        &handlers,
        &caller,
        request_envelope("getPlayer", Payload::Bytes(args), session_with_mid(1)),
    );

    assert!(caller.is_empty());
}

#[test]
fn test_session_request_decode_failure_aborts_without_response() {
    let handlers = local_handlers();
    let caller = RecordingCaller::default();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    invoke_local(
        &mut actor,
        &handlers,
        &caller,
        request_envelope(
            "getPlayer",
            Payload::Bytes(b"definitely not json".to_vec()),
            session_with_mid(1),
        ),
    );

    assert!(caller.is_empty());
}

#[test]
fn test_session_call_unregistered_function_is_tolerated() {
    let handlers = local_handlers();
    let caller = RecordingCaller::default();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    invoke_local(
        &mut actor,
        &handlers,
        &caller,
        request_envelope("noSuchRoute", Payload::Empty, session_with_mid(1)),
    );

    assert!(caller.is_empty());
}

#[test]
fn test_session_handler_fault_does_not_unwind() {
    let mut handlers = LocalHandlers::<PlayerActor, _>::new(JsonSerializer::new());
    handlers
        .register_notify("explode", |_actor, _session, _req: GetPlayerReq| {
            panic!("handler bug");
        })
        .unwrap();

    let serializer = JsonSerializer::new();
    let caller = RecordingCaller::default();
    let mut actor = PlayerActor { level: 1, ticks: 0 };
    let args = serializer
        .serialize(&GetPlayerReq {
            name: "x".to_string(),
        })
        .unwrap();

    // Must return normally; the fault is contained by the engine.
    invoke_local(
        &mut actor,
        &handlers,
        &caller,
        request_envelope("explode", Payload::Bytes(args), session_with_mid(1)),
    );

    assert!(caller.is_empty());
}

#[test]
fn test_notify_handler_mutates_actor_and_session() {
    let mut handlers = LocalHandlers::<PlayerActor, _>::new(JsonSerializer::new());
    handlers
        .register_session("onConnect", |actor: &mut PlayerActor, session| {
            actor.ticks += 1;
            session.set("greeted", "yes");
        })
        .unwrap();

    let caller = RecordingCaller::default();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    invoke_local(
        &mut actor,
        &handlers,
        &caller,
        request_envelope("onConnect", Payload::Empty, session_with_mid(0)),
    );

    assert_eq!(actor.ticks, 1);
    assert!(caller.is_empty());
}

fn remote_handlers() -> RemoteHandlers<PlayerActor, JsonSerializer> {
    let mut handlers = RemoteHandlers::new(JsonSerializer::new());
    handlers
        .register_call(
            "getPlayer",
            |actor: &mut PlayerActor, req: GetPlayerReq| {
                (
                    Some(PlayerInfo {
                        uid: 0,
                        name: req.name,
                        level: actor.level,
                    }),
                    42,
                )
            },
        )
        .unwrap();
    handlers
        .register_code("setLevel", |actor: &mut PlayerActor, level: u32| {
            actor.level = level;
            codes::OK
        })
        .unwrap();
    handlers
        .register_notify0("tick", |actor: &mut PlayerActor| {
            actor.ticks += 1;
        })
        .unwrap();
    handlers
        .register_notify0("explode", |_actor: &mut PlayerActor| {
            panic!("remote handler bug");
        })
        .unwrap();
    handlers
}

fn cluster_envelope(func_name: &str, args: Payload) -> (Envelope, Arc<Mutex<Vec<Vec<u8>>>>) {
    let (reply, sent) = responder();
    let env =
        Envelope::new("game.player.1", "other.node.player", func_name, args)
            .with_cluster_reply(reply);
    (env, sent)
}

#[test]
fn test_cluster_call_code_passes_through_unmodified() {
    let serializer = JsonSerializer::new();
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 5, ticks: 0 };

    let args = serializer
        .serialize(&GetPlayerReq {
            name: "nrgi".to_string(),
        })
        .unwrap();
    let (env, sent) = cluster_envelope("getPlayer", Payload::Bytes(args));

    invoke_remote(&mut actor, &handlers, env);

    let sent = sent.lock();
    assert_eq!(sent.len(), 1);

    let rsp: RpcResponse = serializer.deserialize(&sent[0]).unwrap();
    assert_eq!(rsp.code, 42);

    let info: PlayerInfo = serializer.deserialize(&rsp.data).unwrap();
    assert_eq!(info.level, 5);
}

#[test]
fn test_cluster_call_fault_yields_remote_execute_error_exactly_once() {
    // Scenario C: a panicking cluster handler resolves the one-shot
    // responder exactly once with the fixed code and no payload.
    let serializer = JsonSerializer::new();
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 5, ticks: 0 };

    let (env, sent) = cluster_envelope("explode", Payload::Empty);
    invoke_remote(&mut actor, &handlers, env);

    let sent = sent.lock();
    assert_eq!(sent.len(), 1);

    let rsp: RpcResponse = serializer.deserialize(&sent[0]).unwrap();
    assert_eq!(rsp.code, codes::REMOTE_EXECUTE_ERROR);
    assert!(rsp.data.is_empty());
}

#[test]
fn test_cluster_call_unknown_function_resolves_responder() {
    let serializer = JsonSerializer::new();
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 5, ticks: 0 };

    let (env, sent) = cluster_envelope("noSuchFunc", Payload::Empty);
    invoke_remote(&mut actor, &handlers, env);

    let sent = sent.lock();
    assert_eq!(sent.len(), 1);

    let rsp: RpcResponse = serializer.deserialize(&sent[0]).unwrap();
    assert_eq!(rsp.code, codes::FUNCTION_NOT_FOUND);
}

#[test]
fn test_chan_call_receives_code_only_outcome() {
    let serializer = JsonSerializer::new();
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    let (chan, mut rx) = ChanReply::pair();
    let args = serializer.serialize(&7u32).unwrap();
    let env = Envelope::new("a", "b", "setLevel", Payload::Bytes(args)).with_chan_reply(chan);

    invoke_remote(&mut actor, &handlers, env);

    assert_eq!(actor.level, 7);
    let rsp = rx.try_recv().unwrap();
    assert_eq!(rsp, Some(RpcResponse::code_only(codes::OK)));
}

#[test]
fn test_chan_call_accepts_in_process_value_args() {
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    let (chan, mut rx) = ChanReply::pair();
    let env = Envelope::new("a", "b", "setLevel", Payload::value(9u32)).with_chan_reply(chan);

    invoke_remote(&mut actor, &handlers, env);

    assert_eq!(actor.level, 9);
    assert!(rx.try_recv().unwrap().is_some());
}

#[test]
fn test_chan_call_fault_resolves_with_absent_outcome() {
    // A fault must resolve the rendezvous exactly once, with no outcome,
    // immediately — a blocked waiter is never leaked.
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    let (chan, mut rx) = ChanReply::pair();
    let env = Envelope::new("a", "b", "explode", Payload::Empty).with_chan_reply(chan);

    invoke_remote(&mut actor, &handlers, env);

    assert_eq!(rx.try_recv().unwrap(), None);
}

#[test]
fn test_chan_call_decode_fault_resolves_with_absent_outcome() {
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    let (chan, mut rx) = ChanReply::pair();
    let env = Envelope::new(
        "a",
        "b",
        "setLevel",
        Payload::Bytes(b"not a number".to_vec()),
    )
    .with_chan_reply(chan);

    invoke_remote(&mut actor, &handlers, env);

    assert_eq!(actor.level, 1);
    assert_eq!(rx.try_recv().unwrap(), None);
}

#[test]
fn test_fire_and_forget_runs_without_reply() {
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    // Nullary handler: the payload is never decoded, so stray bytes are fine.
    let env = Envelope::new("a", "b", "tick", Payload::Bytes(b"ignored".to_vec())).cluster();
    invoke_remote(&mut actor, &handlers, env);

    assert_eq!(actor.ticks, 1);
}

#[test]
fn test_fire_and_forget_fault_is_contained() {
    let handlers = remote_handlers();
    let mut actor = PlayerActor { level: 1, ticks: 0 };

    let env = Envelope::new("a", "b", "explode", Payload::Empty);
    invoke_remote(&mut actor, &handlers, env);
}
