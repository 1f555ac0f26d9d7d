//! Sequential callback queue demo showing eager start, queued batches,
//! payload forwarding and teardown.
//!
//! Run with: cargo run --example demo

use std::cell::RefCell;
use std::rc::Rc;

use tandem::{CallbackQueue, Invocation};

// ============================================================================
// A tiny "deployment" domain
// ============================================================================

#[derive(Debug)]
struct Deployment {
    service: &'static str,
}

type DeployQueue = CallbackQueue<Deployment, u32>;
type DeployStep = Invocation<Deployment, u32>;

fn banner(title: &str) {
    println!("\n=== {title} ===");
}

// ============================================================================
// Scenarios
// ============================================================================

/// An idle queue runs the first push inline; steps that advance immediately
/// drain one at a time.
fn eager_start() {
    banner("Eager start");

    let queue: DeployQueue = CallbackQueue::with_owner(Deployment { service: "api" });
    println!("pushing onto an idle queue...");
    queue
        .push(|step: DeployStep| {
            let owner = step.owner().expect("owner is set");
            println!("  [build] building {} (position {})", owner.service, step.position());
            step.advance().expect("queue is live");
        })
        .expect("queue is live");
    println!("push returned; queue idle again: {}", queue.is_idle());
}

/// Steps queued behind a slow step run only when it advances, in push order,
/// with each step forwarding a value to the next.
fn batched_pipeline() {
    banner("Batched pipeline with forwarding");

    let queue: DeployQueue = CallbackQueue::with_owner(Deployment { service: "worker" });

    // The first step "suspends": it parks its continuation for an external
    // event (here, the end of this function) to resume.
    let external: Rc<RefCell<Option<DeployStep>>> = Rc::new(RefCell::new(None));

    let parked = external.clone();
    queue
        .push(move |step: DeployStep| {
            println!("  [build] started, waiting on an external event");
            *parked.borrow_mut() = Some(step);
        })
        .expect("queue is live");

    queue
        .push_with(
            |mut step: DeployStep| {
                let artifact = step.take_passed().expect("build forwards an artifact id");
                let replicas = step.take_bound().expect("replica count bound at push");
                println!("  [deploy] artifact {artifact} to {replicas} replicas");
                step.advance_with(artifact).expect("queue is live");
            },
            3,
        )
        .expect("queue is live");

    queue
        .push(|mut step: DeployStep| {
            let artifact = step.take_passed().expect("deploy forwards the artifact id");
            println!("  [verify] artifact {artifact} healthy");
            step.advance().expect("queue is live");
        })
        .expect("queue is live");

    println!("queued: length {}, index {}", queue.len(), queue.index());

    println!("external event fires, build completes with artifact 7...");
    let held = external.borrow_mut().take().expect("build step parked itself");
    let outcome = held.advance_with(7).expect("queue is live");
    println!("held continuation: {outcome:?}; pipeline drained, idle: {}", queue.is_idle());
}

/// `clear` abandons queued work; a continuation from the cleared batch is a
/// stale no-op.
fn clear_and_teardown() {
    banner("Clear and teardown");

    let queue: DeployQueue = CallbackQueue::new();
    let external: Rc<RefCell<Option<DeployStep>>> = Rc::new(RefCell::new(None));

    let parked = external.clone();
    queue
        .push(move |step: DeployStep| {
            println!("  [migrate] started, holding the line");
            *parked.borrow_mut() = Some(step);
        })
        .expect("queue is live");
    queue
        .push(|step: DeployStep| {
            println!("  [restart] this step is about to be abandoned");
            step.advance().expect("queue is live");
        })
        .expect("queue is live");

    println!("operator aborts the rollout: clear()");
    queue.clear();

    let held = external.borrow_mut().take().expect("migrate step parked itself");
    let outcome = held.advance().expect("queue is live");
    println!("held continuation after clear: {outcome:?} (restart never ran)");

    queue.destroy();
    let refused = queue.push(|step: DeployStep| {
        step.advance().expect("unreachable");
    });
    println!("push after destroy: {:?}", refused.err().expect("destroyed queues refuse work"));
}

fn main() {
    env_logger::init();

    eager_start();
    batched_pipeline();
    clear_and_teardown();

    println!("\ndone");
}
