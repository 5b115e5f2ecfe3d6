//! Closed choice sets and control keywords.

use serde::{Deserialize, Serialize};

/// Resets the conversation from any step.
pub const RESET_KEYWORD: &str = "リセット";
/// Affirmative answer.
pub const YES_KEYWORD: &str = "はい";
/// Negative answer.
pub const NO_KEYWORD: &str = "いいえ";
/// Sent by the "yes" button of the overflow confirmation.
pub const CONFIRM_REVIEW_KEYWORD: &str = "レビューしてください";
/// Sent by the "no" button of the overflow confirmation.
pub const CANCEL_KEYWORD: &str = "キャンセル";

/// Whether `text` is the reset command.
pub fn is_reset(text: &str) -> bool {
    text.trim() == RESET_KEYWORD
}

/// Literary genre of the manuscript.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    OtherworldFantasy,
    ModernFantasy,
    ScienceFiction,
    Romance,
    RomanticComedy,
    ModernDrama,
    Horror,
    Mystery,
    EssayNonfiction,
    Historical,
    PoetryFairyTale,
    Other,
}

impl Genre {
    pub const ALL: [Self; 12] = [
        Self::OtherworldFantasy,
        Self::ModernFantasy,
        Self::ScienceFiction,
        Self::Romance,
        Self::RomanticComedy,
        Self::ModernDrama,
        Self::Horror,
        Self::Mystery,
        Self::EssayNonfiction,
        Self::Historical,
        Self::PoetryFairyTale,
        Self::Other,
    ];

    /// Label shown on the button and sent back by it.
    pub fn label(&self) -> &'static str {
        match self {
            Self::OtherworldFantasy => "異世界ファンタジー",
            Self::ModernFantasy => "現代ファンタジー",
            Self::ScienceFiction => "SF",
            Self::Romance => "恋愛",
            Self::RomanticComedy => "ラブコメ",
            Self::ModernDrama => "現代ドラマ",
            Self::Horror => "ホラー",
            Self::Mystery => "ミステリー",
            Self::EssayNonfiction => "エッセイ・ノンフィクション",
            Self::Historical => "歴史・時代系",
            Self::PoetryFairyTale => "詩・童話",
            Self::Other => "その他",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|g| g.label() == text)
    }
}

/// How strict the critique should be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Gentle,
    Balanced,
    Harsh,
}

impl Level {
    pub const ALL: [Self; 3] = [Self::Gentle, Self::Balanced, Self::Harsh];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Gentle => "甘口",
            Self::Balanced => "中辛",
            Self::Harsh => "辛口",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|l| l.label() == text)
    }
}

/// Which aspect the long-form commentary focuses on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aspect {
    Story,
    Characters,
    Structure,
    Prose,
    Overall,
}

impl Aspect {
    pub const ALL: [Self; 5] = [
        Self::Story,
        Self::Characters,
        Self::Structure,
        Self::Prose,
        Self::Overall,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Story => "ストーリー",
            Self::Characters => "キャラクター",
            Self::Structure => "構成",
            Self::Prose => "文章",
            Self::Overall => "総合",
        }
    }

    pub fn from_label(text: &str) -> Option<Self> {
        let text = text.trim();
        Self::ALL.into_iter().find(|a| a.label() == text)
    }
}
