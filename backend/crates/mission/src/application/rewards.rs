//! Points balance and reward redemption

use crate::domain::entities::{RedeemOutcome, Redemption, Reward};
use crate::domain::repository::RewardRepository;
use crate::domain::value_objects::Actor;
use crate::error::{MissionError, MissionResult};
use kernel::id::RewardId;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct RedeemRewardOutput {
    pub redemption: Redemption,
    pub balance: i64,
}

pub struct RewardsUseCase<R>
where
    R: RewardRepository,
{
    reward_repo: Arc<R>,
}

impl<R> RewardsUseCase<R>
where
    R: RewardRepository,
{
    pub fn new(reward_repo: Arc<R>) -> Self {
        Self { reward_repo }
    }

    pub async fn balance(&self, actor: &Actor) -> MissionResult<i64> {
        self.reward_repo.points_balance(actor.user_id).await
    }

    pub async fn list(&self) -> MissionResult<Vec<Reward>> {
        self.reward_repo.list_active_rewards().await
    }

    pub async fn redeem(&self, actor: &Actor, reward_id: RewardId) -> MissionResult<RedeemRewardOutput> {
        let reward = self
            .reward_repo
            .find_reward(reward_id)
            .await?
            .ok_or(MissionError::RewardNotFound)?;

        if !reward.is_available() {
            return Err(MissionError::RewardUnavailable);
        }

        match self.reward_repo.redeem_reward(reward.id, actor.user_id).await? {
            RedeemOutcome::Redeemed(redemption) => {
                let balance = self.reward_repo.points_balance(actor.user_id).await?;
                tracing::info!(
                    redemption_id = %redemption.id,
                    reward_id = %reward.id,
                    user_id = %actor.user_id,
                    points_spent = redemption.points_spent.value(),
                    "Reward redeemed"
                );
                Ok(RedeemRewardOutput {
                    redemption,
                    balance,
                })
            }
            RedeemOutcome::InsufficientPoints { balance } => {
                Err(MissionError::InsufficientPoints {
                    balance,
                    cost: reward.cost.into(),
                })
            }
            // Sold out between the lookup and the transaction
            RedeemOutcome::Unavailable => Err(MissionError::RewardUnavailable),
        }
    }
}
