/// Account 聚合示例
/// 演示事件溯源的完整流程：开户、存取款、保存（持久化 → 快照 → 发布）与重建
use anyhow::{Result as AnyResult, bail};
use es_domain::aggregate::AggregateRoot;
use es_domain::aggregate_store::AggregateEventStore;
use es_domain::config::AggregateStoreConfig;
use es_domain::entity::Entity;
use es_domain::eventing::InMemoryEventBus;
use es_domain::persist::{InMemoryEventStore, InMemorySnapshotStore};
use es_macros::{aggregate_root, domain_event};
use futures_util::StreamExt;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use ulid::Ulid;

// ============================================================================
// 领域模型定义
// ============================================================================

#[aggregate_root]
struct Account {
    balance: u64,
    opened: bool,
}

#[derive(Debug)]
enum AccountCommand {
    Open { initial_balance: u64 },
    Deposit { amount: u64 },
    Withdraw { amount: u64 },
}

#[domain_event]
enum AccountEvent {
    #[event(event_type = "account.opened")]
    Opened { initial_balance: u64 },
    #[event(event_type = "account.deposited")]
    Deposited { amount: u64 },
    #[event(event_type = "account.withdrawn")]
    Withdrawn { amount: u64 },
}

impl AggregateRoot for Account {
    const TYPE: &'static str = "account";
    type Event = AccountEvent;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Opened { initial_balance } => {
                self.opened = true;
                self.balance = *initial_balance;
            }
            AccountEvent::Deposited { amount } => self.balance += amount,
            AccountEvent::Withdrawn { amount } => self.balance -= amount,
        }
    }
}

impl Account {
    /// 校验命令并产生事件
    fn handle(&mut self, command: AccountCommand) -> AnyResult<()> {
        let event = match command {
            AccountCommand::Open { initial_balance } => {
                if self.opened {
                    bail!("account {} already opened", self.aggregate_id());
                }
                AccountEvent::Opened { initial_balance }
            }
            AccountCommand::Deposit { amount } => AccountEvent::Deposited { amount },
            AccountCommand::Withdraw { amount } => {
                if amount > self.balance {
                    bail!("insufficient funds: balance={}, amount={amount}", self.balance);
                }
                AccountEvent::Withdrawn { amount }
            }
        };
        self.raise_event(event)?;
        Ok(())
    }
}

// ============================================================================
// 主流程
// ============================================================================

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let bus = Arc::new(InMemoryEventBus::default());
    let mut subscription = bus.subscribe();
    let store = AggregateEventStore::with_config(
        Arc::new(InMemoryEventStore::new()),
        Arc::new(InMemorySnapshotStore::new()),
        bus.clone(),
        AggregateStoreConfig::from_env()?,
    );

    let projector = tokio::spawn(async move {
        let mut seen = 0usize;
        while let Some(Ok(record)) = subscription.next().await {
            seen += 1;
            info!(
                aggregate_id = record.aggregate_id(),
                aggregate_version = record.aggregate_version(),
                event_type = record.event_type(),
                "projected"
            );
            if seen == 4 {
                break;
            }
        }
        seen
    });

    let id = Ulid::new().to_string();
    let mut account = Account::new(id.clone());
    account.handle(AccountCommand::Open {
        initial_balance: 100,
    })?;
    account.handle(AccountCommand::Deposit { amount: 50 })?;
    let report = store.save(&mut account).await?;
    info!(?report, "first save");

    account.handle(AccountCommand::Withdraw { amount: 30 })?;
    account.handle(AccountCommand::Deposit { amount: 5 })?;
    let report = store.save(&mut account).await?;
    info!(?report, "second save");

    if let Err(err) = account.handle(AccountCommand::Withdraw { amount: 1_000 }) {
        info!(%err, "command rejected");
    }

    let loaded: Account = store.load(&id).await?;
    info!(
        aggregate_id = loaded.aggregate_id(),
        aggregate_version = loaded.aggregate_version(),
        balance = loaded.balance,
        "reloaded account"
    );
    assert_eq!(loaded.balance, 125);
    assert_eq!(loaded.aggregate_version(), 4);

    let projected = projector.await?;
    info!(projected, "projection caught up");
    Ok(())
}
