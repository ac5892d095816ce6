use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use clap::Parser;
use http::Response;
use serde::{Deserialize, Serialize};

use courier_core::app::{HttpWorker, JobsWorker, Server, TaskProducer};
use courier_core::config::{CourierConfig, load_config};
use courier_core::domain::{AppRequest, CourierError, Mode, RawRequest, TaskOptions};
use courier_core::impls::{InMemoryHttpTransport, InMemorySession, InMemoryTaskQueue};
use courier_core::observability::init_tracing;
use courier_core::ports::{Application, ReceivedTask};
use courier_core::typed::{DispatcherRegistry, Payload, PayloadRegistry, TaskDispatcher};
use courier_core::ConfigurationError;

/// courier：in-memory transport とデモアプリケーションで worker を 1 つ動かす
#[derive(Debug, Parser)]
#[command(name = "courier", version)]
struct Args {
    /// TOML 設定ファイル（省略時はデフォルト値）
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// 実行モード（省略時は RR_MODE）
    #[arg(short, long)]
    mode: Option<String>,

    /// 設定の `app.production` を上書き
    #[arg(long)]
    production: bool,
}

#[derive(Debug, Serialize, Deserialize)]
struct Hello {
    name: String,
}

impl Payload for Hello {
    const TYPE: &'static str = "demo.hello.v1";
}

struct HelloDispatcher;

#[async_trait]
impl TaskDispatcher for HelloDispatcher {
    const NAME: &'static str = "demo.hello";
    type Payload = Hello;

    async fn process(
        &self,
        task: &mut dyn ReceivedTask,
        payload: Option<Hello>,
    ) -> Result<(), CourierError> {
        match payload {
            Some(hello) => tracing::info!(task_id = %task.id(), "Hello, {}!", hello.name),
            None => tracing::info!(task_id = %task.id(), "Hello, whoever you are!"),
        }
        Ok(())
    }
}

struct DemoApp {
    production: bool,
}

#[async_trait]
impl Application for DemoApp {
    async fn run(&self, request: &AppRequest) -> Result<Response<Bytes>, CourierError> {
        match request.uri().path() {
            "/" => Ok(Response::new(Bytes::from_static(b"courier says hi"))),
            "/admin" => Err(CourierError::access_denied("the admin area needs a login")),
            "/boom" => Err(CourierError::application("demo failure")),
            path => Err(CourierError::route_not_found(format!("no page at {path}"))),
        }
    }

    fn language(&self) -> String {
        "en".to_string()
    }

    fn is_production(&self) -> bool {
        self.production
    }
}

fn demo_requests() -> Vec<RawRequest> {
    vec![
        RawRequest::new("GET", "/"),
        RawRequest::new("GET", "/missing").with_header("Accept", "application/json"),
        RawRequest::new("GET", "/admin").with_header("Accept", "text/html"),
        RawRequest::new("GET", "/boom"),
        RawRequest::new("BAD METHOD", "/"),
    ]
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => CourierConfig::default(),
    };
    if args.production {
        config.app.production = true;
    }
    run_with(config, args.mode).await
}

/// 設定からデモ用の worker を組み立てて実行
///
/// # フロー
/// 1. デモタスクをキューに積む（push / plan / dispatch）
/// 2. `config.workers` のモードごとに worker を登録（組み込み worker のないモードはエラー）
/// 3. `mode`（省略時は RR_MODE）の worker を実行
async fn run_with(config: CourierConfig, mode: Option<String>) -> Result<(), Box<dyn std::error::Error>> {

    let application = Arc::new(DemoApp {
        production: config.app.production,
    });

    let payloads = Arc::new(PayloadRegistry::new().with::<Hello>()?);
    let serializer = config.jobs.serializer.build(payloads);
    let mut dispatchers = DispatcherRegistry::new();
    dispatchers.register(HelloDispatcher)?;
    let dispatchers = Arc::new(dispatchers);

    let transport = Arc::new(InMemoryHttpTransport::scripted(demo_requests()));
    let queue = Arc::new(InMemoryTaskQueue::new(config.jobs.queue.clone()));

    let mut producer = TaskProducer::new(queue.clone(), serializer.clone());
    producer
        .push::<HelloDispatcher>(
            Some(Hello {
                name: "courier".to_string(),
            }),
            TaskOptions::default(),
        )
        .await?;
    producer.plan::<HelloDispatcher>(None, TaskOptions::default());
    producer.plan::<HelloDispatcher>(
        Some(Hello {
            name: "batch".to_string(),
        }),
        TaskOptions::new().with_priority(10),
    );
    producer.dispatch().await?;
    queue.enqueue("demo.unknown", Vec::new()).await?;
    queue.close();

    let mut builder = Server::builder();
    for mode in &config.workers {
        builder = match mode {
            Mode::Http => builder.register(
                Mode::Http,
                HttpWorker::new(
                    transport.clone(),
                    application.clone(),
                    Arc::new(InMemorySession::default()),
                ),
            )?,
            Mode::Jobs => builder.register(
                Mode::Jobs,
                JobsWorker::new(
                    queue.clone(),
                    dispatchers.clone(),
                    serializer.clone(),
                    application.clone(),
                ),
            )?,
            Mode::Other(name) => {
                return Err(ConfigurationError::MissingWorkers(vec![name.clone()]).into());
            }
        };
    }
    let mut server = builder.expect_modes(&config.worker_names()).build()?;

    match mode {
        Some(mode) => server.run_mode(&Mode::from(mode)).await?,
        None => server.run().await?,
    }

    for response in transport.take_responses() {
        tracing::info!(status = %response.status(), body = %String::from_utf8_lossy(response.body()), "response");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let args = Args::parse();

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "courier worker failed");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mode_without_builtin_worker_fails_at_startup() {
        let config = CourierConfig {
            workers: vec![Mode::Jobs, Mode::from("rpc")],
            ..CourierConfig::default()
        };

        let err = run_with(config, Some("jobs".to_string())).await.unwrap_err();

        match err.downcast_ref::<ConfigurationError>() {
            Some(ConfigurationError::MissingWorkers(modes)) => assert_eq!(modes, &vec!["rpc".to_string()]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_builtin_modes_run() {
        let config = CourierConfig::default();
        run_with(config, Some("jobs".to_string())).await.unwrap();
    }
}
