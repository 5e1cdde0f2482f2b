//! Minimal negi example — three middlewares assembling one JSON response.
//!
//! Run with:
//!   RUST_LOG=debug cargo run --example basic
//!
//! Try:
//!   curl -i http://localhost:3000/
//!
//! Each middleware contributes one field to a shared profile; the outermost
//! one waits for the inner layers to finish, then turns the assembled
//! profile into the response body. Registration order is nesting order, so
//! the body is built only after every layer has run.

use std::sync::{Arc, Mutex};

use negi::{App, Context, Error, Next};
use serde_json::{json, Map, Value};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let profile: Arc<Mutex<Map<String, Value>>> = Arc::default();

    let name = {
        let profile = Arc::clone(&profile);
        move |ctx: Context, next: Next| {
            let profile = Arc::clone(&profile);
            async move {
                profile.lock().unwrap().insert("name".into(), json!("Heathcliff Huu"));
                let mut ctx = next.run(ctx).await?;
                let assembled = Value::Object(profile.lock().unwrap().clone());
                ctx.response.set_content_type("json");
                ctx.set_body(assembled);
                Ok::<_, Error>(ctx)
            }
        }
    };

    let age = {
        let profile = Arc::clone(&profile);
        move |ctx: Context, next: Next| {
            let profile = Arc::clone(&profile);
            async move {
                profile.lock().unwrap().insert("age".into(), json!(24));
                next.run(ctx).await
            }
        }
    };

    let sex = {
        let profile = Arc::clone(&profile);
        move |ctx: Context, next: Next| {
            let profile = Arc::clone(&profile);
            async move {
                profile.lock().unwrap().insert("sex".into(), json!("Man"));
                next.run(ctx).await
            }
        }
    };

    App::new()
        .with(name)
        .with(age)
        .with(sex)
        .on_error(|err| eprintln!("pipeline error: {err}"))
        .listen("0.0.0.0:3000")
        .await
        .expect("server error");
}
