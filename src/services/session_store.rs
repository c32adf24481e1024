//! 会话存储 - 业务能力层
//!
//! 只负责"用户 → API key"的映射，不关心求解流程

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::models::Credential;

/// 凭证存储能力
///
/// 职责：
/// - `set` 直接覆盖旧值，不合并、不过期、不校验格式
/// - `get` 返回调用时刻的快照，之后的覆盖不会影响已取出的值
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, user_id: &str) -> Option<Credential>;

    async fn set(&self, user_id: &str, credential: Credential);
}

/// 内存中的会话存储
///
/// 外层表只在查找 / 插入槽位时短暂加锁；每个用户有自己的互斥锁，
/// 不同用户的读写互不阻塞。
#[derive(Default)]
pub struct InMemorySessionStore {
    slots: RwLock<HashMap<String, Arc<Mutex<Credential>>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn slot(&self, user_id: &str) -> Option<Arc<Mutex<Credential>>> {
        self.slots.read().await.get(user_id).cloned()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get(&self, user_id: &str) -> Option<Credential> {
        let slot = self.slot(user_id).await?;
        let credential = slot.lock().await.clone();
        Some(credential)
    }

    async fn set(&self, user_id: &str, credential: Credential) {
        if let Some(slot) = self.slot(user_id).await {
            *slot.lock().await = credential;
            debug!("用户 {} 的 API key 已更新", user_id);
            return;
        }

        let mut slots = self.slots.write().await;
        match slots.get(user_id) {
            // 两次查找之间可能已被其他任务插入
            Some(slot) => {
                let slot = slot.clone();
                drop(slots);
                *slot.lock().await = credential;
            }
            None => {
                slots.insert(user_id.to_string(), Arc::new(Mutex::new(credential)));
            }
        }
        debug!("用户 {} 的 API key 已保存", user_id);
    }
}
