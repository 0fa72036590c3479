use scenegraph_ecs::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;

/// Mirrors its entity's position changes into a shared log
struct PositionMirror {
    seen: Rc<RefCell<Vec<Vec3>>>,
}

impl Component for PositionMirror {
    const NAME: &'static str = "PositionMirror";

    fn init_component(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        let seen = self.seen.clone();
        ctx.register_handler(topics::UPDATE_POSITION, move |_ctx, msg| {
            if let Some(position) = msg.value().as_vec3() {
                seen.borrow_mut().push(position);
            }
            Ok(())
        })?;
        Ok(())
    }
}

/// Forwards pings to a named entity once wired up in init_entity
struct Relay {
    target: Option<EntityId>,
}

impl Component for Relay {
    const NAME: &'static str = "Relay";

    fn init_entity(&mut self, ctx: &mut Context<'_>) -> Result<()> {
        self.target = ctx.find_entity("listener")?;
        Ok(())
    }

    fn update(&mut self, ctx: &mut Context<'_>, elapsed: f32) -> Result<()> {
        if let Some(target) = self.target {
            let msg = Message::new("relay", elapsed).with("from", ctx.name().to_string());
            ctx.broadcast_to(target, &msg)?;
        }
        Ok(())
    }
}

#[test]
fn test_component_handler_sees_position_updates() {
    let mut manager = EntityManager::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let id = manager.create_entity(Some("mirror"));
    manager
        .add_component(id, PositionMirror { seen: seen.clone() })
        .unwrap();
    manager.init_entity(id, None).unwrap();

    manager.set_position(id, Vec3::X).unwrap();
    manager.set_position(id, Vec3::Y).unwrap();
    assert_eq!(seen.borrow().as_slice(), &[Vec3::X, Vec3::Y]);
}

#[test]
fn test_rotation_topic_carries_normalized_value() {
    let mut manager = EntityManager::new();
    let id = manager.create_entity(Some("spinner"));
    manager.init_entity(id, None).unwrap();
    let seen = Rc::new(RefCell::new(None));

    let sink = seen.clone();
    manager
        .register_handler(id, topics::UPDATE_ROTATION, move |_ctx, msg| {
            *sink.borrow_mut() = msg.value().as_quat();
            Ok(())
        })
        .unwrap();

    manager
        .set_rotation(id, Quat::from_xyzw(0.0, 0.0, 0.0, 4.0))
        .unwrap();
    assert_eq!(*seen.borrow(), Some(Quat::IDENTITY));
}

#[test]
fn test_cross_entity_relay() {
    let mut manager = EntityManager::new();
    let received = Rc::new(RefCell::new(Vec::new()));

    let listener = manager.create_entity(Some("listener"));
    manager.init_entity(listener, None).unwrap();
    let sink = received.clone();
    manager
        .register_handler(listener, "relay", move |ctx, msg| {
            let from = msg.get("from").and_then(Payload::as_str).unwrap_or_default();
            sink.borrow_mut().push(format!("{} <- {}", ctx.name(), from));
            Ok(())
        })
        .unwrap();

    let relay = manager.create_entity(Some("relay"));
    manager.add_component(relay, Relay { target: None }).unwrap();
    manager.init_entity(relay, None).unwrap();

    manager.update(0.016).unwrap();
    manager.update(0.016).unwrap();
    assert_eq!(
        received.borrow().as_slice(),
        &["listener <- relay", "listener <- relay"]
    );
}

#[test]
fn test_unregister_handler() {
    let mut manager = EntityManager::new();
    let id = manager.create_entity(Some("hub"));
    manager.init_entity(id, None).unwrap();
    let calls = Rc::new(RefCell::new(0));

    let counter = calls.clone();
    let handle = manager
        .register_handler(id, "ping", move |_ctx, _msg| {
            *counter.borrow_mut() += 1;
            Ok(())
        })
        .unwrap();

    manager.broadcast(id, &Message::signal("ping")).unwrap();
    assert!(manager.unregister_handler(id, "ping", handle).unwrap());
    manager.broadcast(id, &Message::signal("ping")).unwrap();

    assert_eq!(*calls.borrow(), 1);
    assert!(!manager.unregister_handler(id, "ping", handle).unwrap());
}

#[test]
fn test_handler_can_unregister_itself_mid_dispatch() {
    let mut manager = EntityManager::new();
    let id = manager.create_entity(Some("hub"));
    manager.init_entity(id, None).unwrap();
    let log = Rc::new(RefCell::new(Vec::new()));
    let slot: Rc<RefCell<Option<HandlerId>>> = Rc::new(RefCell::new(None));

    let first_log = log.clone();
    let first_slot = slot.clone();
    let first = manager
        .register_handler(id, "once", move |ctx, _msg| {
            first_log.borrow_mut().push("first");
            if let Some(handle) = *first_slot.borrow() {
                ctx.unregister_handler("once", handle)?;
            }
            Ok(())
        })
        .unwrap();
    *slot.borrow_mut() = Some(first);

    let second_log = log.clone();
    manager
        .register_handler(id, "once", move |_ctx, _msg| {
            second_log.borrow_mut().push("second");
            Ok(())
        })
        .unwrap();

    manager.broadcast(id, &Message::signal("once")).unwrap();
    manager.broadcast(id, &Message::signal("once")).unwrap();
    assert_eq!(log.borrow().as_slice(), &["first", "second", "second"]);
}
