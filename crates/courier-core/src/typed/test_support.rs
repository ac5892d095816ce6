//! テスト用の payload と dispatcher

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::dispatcher::TaskDispatcher;
use super::payload::Payload;
use crate::domain::CourierError;
use crate::ports::ReceivedTask;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Greeting {
    pub name: String,
}

impl Payload for Greeting {
    const TYPE: &'static str = "test.greeting.v1";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    pub number: u64,
    pub cents: i64,
}

impl Payload for Invoice {
    const TYPE: &'static str = "test.invoice.v1";
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub title: String,
    pub tags: Vec<String>,
    pub totals: BTreeMap<String, f64>,
    pub note: Option<String>,
}

impl Payload for Report {
    const TYPE: &'static str = "test.report.v1";
}

/// 空のときエンコードから省かれるフィールドを持つ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mail {
    pub to: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cc: Option<String>,
}

impl Payload for Mail {
    const TYPE: &'static str = "test.mail.v1";
}

/// 受け取った名前を記録
#[derive(Default)]
pub struct GreetingDispatcher {
    pub seen: Arc<Mutex<Vec<Option<String>>>>,
}

#[async_trait]
impl TaskDispatcher for GreetingDispatcher {
    const NAME: &'static str = "greeting.send";
    type Payload = Greeting;

    async fn process(
        &self,
        _task: &mut dyn ReceivedTask,
        payload: Option<Greeting>,
    ) -> Result<(), CourierError> {
        self.seen.lock().unwrap().push(payload.map(|g| g.name));
        Ok(())
    }
}

/// 自分で ack してから返る
pub struct InvoiceDispatcher;

#[async_trait]
impl TaskDispatcher for InvoiceDispatcher {
    const NAME: &'static str = "invoice.issue";
    type Payload = Invoice;

    async fn process(
        &self,
        task: &mut dyn ReceivedTask,
        _payload: Option<Invoice>,
    ) -> Result<(), CourierError> {
        task.ack()
            .await
            .map_err(|e| CourierError::application("ack failed").with_source(e))
    }
}

/// 常に失敗
pub struct FailingDispatcher;

#[async_trait]
impl TaskDispatcher for FailingDispatcher {
    const NAME: &'static str = "always.fails";
    type Payload = Greeting;

    async fn process(
        &self,
        _task: &mut dyn ReceivedTask,
        _payload: Option<Greeting>,
    ) -> Result<(), CourierError> {
        Err(CourierError::application("boom"))
    }
}

/// ack した後で失敗する
pub struct AckThenFailDispatcher;

#[async_trait]
impl TaskDispatcher for AckThenFailDispatcher {
    const NAME: &'static str = "ack.then.fail";
    type Payload = Greeting;

    async fn process(
        &self,
        task: &mut dyn ReceivedTask,
        _payload: Option<Greeting>,
    ) -> Result<(), CourierError> {
        task.ack()
            .await
            .map_err(|e| CourierError::application("ack failed").with_source(e))?;
        Err(CourierError::application("failed after ack"))
    }
}

pub struct NamelessDispatcher;

#[async_trait]
impl TaskDispatcher for NamelessDispatcher {
    const NAME: &'static str = "";
    type Payload = Greeting;

    async fn process(
        &self,
        _task: &mut dyn ReceivedTask,
        _payload: Option<Greeting>,
    ) -> Result<(), CourierError> {
        Ok(())
    }
}
