//! Example: what the chain accepts from interceptors
//!
//! Runs calls against a local server with well-behaved and misbehaving
//! interceptors and prints how each one ends:
//! - application interceptors may short-circuit or proceed repeatedly
//! - network interceptors must proceed exactly once and keep the target
//! - per-call timeouts override the client defaults
//!
//! Run with: cargo run --bin interceptor-contract

use std::time::Duration;

use axum::http::StatusCode;
use hopchain_client::{
    CallOptions, Chain, ChainError, Client, FnInterceptor, HeaderInterceptor, LogLevel, LoggingInterceptor,
    Request, Response, ResponseBody,
};
use hopchain_examples::{init_tracing, spawn_demo_server};

fn report(name: &str, result: Result<Response, ChainError>) {
    match result {
        Ok(response) => {
            let text = response
                .body()
                .and_then(|body| body.text().ok())
                .unwrap_or("")
                .to_string();
            println!("  {name}: {} {text:?}", response.status());
        }
        Err(e) => println!("  {name}: error: {e}"),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let addr = spawn_demo_server()?;
    let hello = format!("http://{addr}/hello");

    println!("=== Interceptor contract ===");

    let client = Client::builder()
        .add_interceptor(HeaderInterceptor::new("x-demo", "1")?)
        .add_network_interceptor(LoggingInterceptor::new(LogLevel::Headers))
        .build()?;
    report("well-behaved", client.execute(Request::get(hello.as_str())?));

    let cached = Client::builder()
        .add_interceptor(FnInterceptor::new("cache", |chain: &Chain<'_>| {
            Ok(Response::new(
                chain.request().clone(),
                StatusCode::OK,
                ResponseBody::new("from cache"),
            ))
        }))
        .build()?;
    report("short-circuit", cached.execute(Request::get(hello.as_str())?));

    let double = Client::builder()
        .add_network_interceptor(FnInterceptor::new("double", |chain: &Chain<'_>| {
            chain.proceed(chain.request().clone())?;
            chain.proceed(chain.request().clone())
        }))
        .build()?;
    report("proceed twice", double.execute(Request::get(hello.as_str())?));

    let redirect_target = format!("http://localhost:{}/hello", addr.port());
    let redirect = Client::builder()
        .add_network_interceptor(FnInterceptor::new("redirect", move |chain: &Chain<'_>| {
            let request = chain
                .request()
                .to_builder()
                .uri(redirect_target.as_str())
                .build()?;
            chain.proceed(request)
        }))
        .build()?;
    report("change target", redirect.execute(Request::get(hello.as_str())?));

    let impatient = Client::builder()
        .read_timeout(Duration::from_millis(100))
        .build()?;
    let slow = format!("http://{addr}/slow");
    report("read timeout", impatient.execute(Request::get(slow.as_str())?));
    let call = impatient.new_call_with_options(
        Request::get(slow.as_str())?,
        CallOptions::new().read_timeout(Duration::from_secs(2)),
    );
    report("per-call override", call.execute());

    Ok(())
}
