use crate::logic::board::PieceType;
use crate::logic::eval_constants::{
    MOBILITY_WEIGHT, QUIESCENCE_MAX_DEPTH, VAL_ADVISOR, VAL_CANNON, VAL_CHARIOT, VAL_ELEPHANT,
    VAL_HORSE, VAL_KING, VAL_PAWN,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    // Evaluation Parameters
    pub val_pawn: i32,
    pub val_advisor: i32,
    pub val_elephant: i32,
    pub val_horse: i32,
    pub val_cannon: i32,
    pub val_chariot: i32,
    pub val_king: i32,
    pub mobility_weight: f64,

    // Search Parameters
    pub quiescence_depth: u8,
    pub mate_score: f64,
    pub default_depth: u8,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            val_pawn: VAL_PAWN,
            val_advisor: VAL_ADVISOR,
            val_elephant: VAL_ELEPHANT,
            val_horse: VAL_HORSE,
            val_cannon: VAL_CANNON,
            val_chariot: VAL_CHARIOT,
            val_king: VAL_KING,
            mobility_weight: MOBILITY_WEIGHT,

            quiescence_depth: QUIESCENCE_MAX_DEPTH,
            mate_score: 1_000_000.0,
            default_depth: Difficulty::Medium.depth(),
        }
    }
}

/// Difficulty levels offered to players, each a fixed search depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const fn depth(self) -> u8 {
        match self {
            Self::Easy => 2,
            Self::Medium => 3,
            Self::Hard => 4,
        }
    }
}

// Piece values are scale factors here; everything else is absolute.
#[derive(Deserialize)]
struct EngineConfigJson {
    val_pawn: Option<f32>,
    val_advisor: Option<f32>,
    val_elephant: Option<f32>,
    val_horse: Option<f32>,
    val_cannon: Option<f32>,
    val_chariot: Option<f32>,
    val_king: Option<f32>,
    mobility_weight: Option<f64>,

    quiescence_depth: Option<u8>,
    mate_score: Option<f64>,
    default_depth: Option<u8>,
    difficulty: Option<Difficulty>,
}

impl EngineConfig {
    pub fn load_from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        let json_config: EngineConfigJson = serde_json::from_str(json_str)?;
        let default = Self::default();

        let default_depth = json_config
            .default_depth
            .or_else(|| json_config.difficulty.map(Difficulty::depth))
            .unwrap_or(default.default_depth);

        Ok(Self {
            val_pawn: apply_scale(default.val_pawn, json_config.val_pawn),
            val_advisor: apply_scale(default.val_advisor, json_config.val_advisor),
            val_elephant: apply_scale(default.val_elephant, json_config.val_elephant),
            val_horse: apply_scale(default.val_horse, json_config.val_horse),
            val_cannon: apply_scale(default.val_cannon, json_config.val_cannon),
            val_chariot: apply_scale(default.val_chariot, json_config.val_chariot),
            val_king: apply_scale(default.val_king, json_config.val_king),
            mobility_weight: json_config
                .mobility_weight
                .unwrap_or(default.mobility_weight),

            quiescence_depth: json_config
                .quiescence_depth
                .unwrap_or(default.quiescence_depth),
            mate_score: json_config.mate_score.unwrap_or(default.mate_score),
            default_depth,
        })
    }

    pub const fn piece_value(&self, pt: PieceType) -> i32 {
        match pt {
            PieceType::King => self.val_king,
            PieceType::Advisor => self.val_advisor,
            PieceType::Elephant => self.val_elephant,
            PieceType::Horse => self.val_horse,
            PieceType::Chariot => self.val_chariot,
            PieceType::Cannon => self.val_cannon,
            PieceType::Pawn => self.val_pawn,
        }
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn apply_scale(default_val: i32, scale: Option<f32>) -> i32 {
    scale.map_or(default_val, |s| (default_val as f32 * s) as i32)
}
