//! Example: form variables feeding a reconnecting subscription
//!
//! Run with `RUST_LOG=fos_net=debug` to watch the resubscribe backoff.

use std::rc::Rc;
use std::time::Duration;

use anyhow::Context;
use fos_dom::{DomTree, FieldsetElement, FormElement, InputElement};
use fos_forms::{extract_value_hash, VariableRule};
use fos_net::{
    ConnectorError, GraphqlSubscriptionPayload, LifecycleEvent, LocalScheduler, ManualConnector,
    ReconnectingSubscriber, ResubscribeConfig, SubscriberHooks,
};
use serde_json::json;
use smol::{LocalExecutor, Timer};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut tree = DomTree::new();
    let form = tree.append_element(tree.root(), FormElement::new())?;
    tree.append_element(form, InputElement::text().with_name("room").with_value("lobby"))?;
    let filters = tree.append_element(form, FieldsetElement::named("filters"))?;
    for kind in ["join", "leave"] {
        tree.append_element(filters, InputElement::text().with_name("kinds[]").with_value(kind))?;
    }

    let variables = extract_value_hash(&tree, form);
    println!("variables: {}", variables.to_json());

    let payload = GraphqlSubscriptionPayload::new(
        "subscription Events($room: String!, $filters: Filters) { events(room: $room, filters: $filters) }",
    )
    .with_operation_name("Events")
    .with_variables(variables)
    .with_rule(VariableRule::new("room").required().max_length(32));

    let executor = Rc::new(LocalExecutor::new());
    let connector = Rc::new(ManualConnector::new());
    let scheduler = Rc::new(LocalScheduler::new(Rc::clone(&executor)));
    // Milliseconds instead of seconds so the demo finishes quickly
    let config = ResubscribeConfig::new()
        .with_base_delay_ms(30)
        .with_step_ms(10)
        .with_max_delay_ms(320);
    let subscriber = ReconnectingSubscriber::with_config(connector.clone(), scheduler, config);

    subscriber.subscribe(
        payload,
        SubscriberHooks::new(|capsule| match capsule.data() {
            Some(data) => println!("event: {}", data.to_json()),
            None => println!("no data: {:?}", capsule.errors()),
        })
        .on_disconnected(|event| println!("disconnected: {}", event.error)),
    );

    smol::block_on(executor.run(async {
        connector.emit_next(json!({"data": {"events": "alice joined"}}));

        for _ in 0..3 {
            connector.emit_error(ConnectorError::Closed {
                code: 1006,
                reason: "abnormal closure".into(),
            });
            let wait = subscriber.calculate_resubscribe_delay();
            println!("next retry would wait {wait:?}");
            Timer::after(Duration::from_millis(400)).await;
        }

        connector.emit_lifecycle(LifecycleEvent::Connected);
        connector.emit_next(json!({"data": {"events": "bob left"}}));
    }));

    let message = connector
        .last_message()
        .context("connector never saw a subscription")?;
    println!("subscriptions opened: {}", connector.subscribe_count());
    println!("last message: {message}");

    subscriber.unsubscribe();
    Ok(())
}
