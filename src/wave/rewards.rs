//! Wave reward generation.

use bevy::prelude::*;

use crate::combat::events::{RewardDrop, RewardType};
use crate::data::tables::WaveRewardRow;
use crate::sim::components::GameRng;

/// Item id of the placeholder drop granted by a non-empty item pool.
pub const PLACEHOLDER_ITEM_ID: u32 = 1001;

/// Roll the rewards of one cleared wave.
///
/// Gold is uniform in `[gold_min, gold_max]`, scaled by `1 + early_bonus`
/// and rounded half to even; zero gold is not reported. A non-empty item pool adds one
/// placeholder item.
pub fn generate_rewards(
    table: Option<&WaveRewardRow>,
    early_bonus: Option<f32>,
    rng: &mut GameRng,
) -> Vec<RewardDrop> {
    let mut rewards = Vec::new();
    let Some(table) = table else {
        return rewards;
    };

    let bonus = early_bonus.unwrap_or(0.0);
    let rolled = rng.random_int_inclusive(table.gold_min, table.gold_max);
    let gold = (rolled as f32 * (1.0 + bonus)).round_ties_even() as i32;
    if gold > 0 {
        rewards.push(RewardDrop {
            reward_type: RewardType::Gold,
            item_id: 0,
            amount: gold,
        });
    }

    if !table.item_pool_id.trim().is_empty() {
        rewards.push(RewardDrop {
            reward_type: RewardType::Item,
            item_id: PLACEHOLDER_ITEM_ID,
            amount: 1,
        });
    }

    rewards
}

/// Running totals of everything dropped this encounter.
#[derive(Resource, Debug, Clone, Default)]
pub struct RewardLedger {
    pub gold: i64,
    pub drops: Vec<RewardDrop>,
}

impl RewardLedger {
    pub fn record(&mut self, rewards: &[RewardDrop]) {
        for reward in rewards {
            if reward.reward_type == RewardType::Gold {
                self.gold += i64::from(reward.amount);
            }
            self.drops.push(reward.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(min: i32, max: i32, pool: &str) -> WaveRewardRow {
        WaveRewardRow {
            reward_table_id: "R".into(),
            gold_min: min,
            gold_max: max,
            item_pool_id: pool.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_gold_within_range() {
        let mut rng = GameRng::from_seed(3);
        let row = table(10, 20, "");
        for _ in 0..50 {
            let rewards = generate_rewards(Some(&row), None, &mut rng);
            assert_eq!(rewards.len(), 1);
            assert!((10..=20).contains(&rewards[0].amount));
        }
    }

    #[test]
    fn test_early_bonus_scales_and_rounds() {
        let mut rng = GameRng::from_seed(3);
        let row = table(10, 10, "");
        let rewards = generate_rewards(Some(&row), Some(0.25), &mut rng);
        // 10 * 1.25 = 12.5 rounds to the even neighbour
        assert_eq!(rewards[0].amount, 12);

        let row = table(14, 14, "");
        let rewards = generate_rewards(Some(&row), Some(0.5), &mut rng);
        assert_eq!(rewards[0].amount, 21);
    }

    #[test]
    fn test_zero_gold_not_reported_item_placeholder() {
        let mut rng = GameRng::from_seed(3);
        let row = table(0, 0, "pool_a");
        let rewards = generate_rewards(Some(&row), None, &mut rng);
        assert_eq!(
            rewards,
            vec![RewardDrop {
                reward_type: RewardType::Item,
                item_id: PLACEHOLDER_ITEM_ID,
                amount: 1
            }]
        );
    }

    #[test]
    fn test_missing_table_yields_nothing() {
        let mut rng = GameRng::from_seed(3);
        assert!(generate_rewards(None, Some(1.0), &mut rng).is_empty());
    }

    #[test]
    fn test_ledger_totals_gold() {
        let mut ledger = RewardLedger::default();
        ledger.record(&[
            RewardDrop {
                reward_type: RewardType::Gold,
                item_id: 0,
                amount: 15,
            },
            RewardDrop {
                reward_type: RewardType::Item,
                item_id: PLACEHOLDER_ITEM_ID,
                amount: 1,
            },
        ]);
        ledger.record(&[RewardDrop {
            reward_type: RewardType::Gold,
            item_id: 0,
            amount: 5,
        }]);
        assert_eq!(ledger.gold, 20);
        assert_eq!(ledger.drops.len(), 3);
    }
}
