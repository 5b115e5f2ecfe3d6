//! Prompts for critique generation and follow-up questions.

use super::catalog::Level;
use super::state::ConversationState;

/// Persona shared by the critique and Q&A prompts.
const PERSONA: &str = "\
あなたは友達に話しかけるような、かわいらしい男の子のキャラクターです。
敬語は使わず、親しみやすいフランクな口調で話してください。";

/// Build the critique prompt from the collected selections and manuscript.
pub fn review_prompt(state: &ConversationState) -> String {
    let genre = state.genre.map(|g| g.label()).unwrap_or("未指定");
    let aspect = state.aspect.map(|a| a.label()).unwrap_or("総合");
    let level = state.level.map(|l| l.label()).unwrap_or("中辛");
    let strictness = match state.level {
        Some(Level::Gentle) => "良いところを中心に、やさしく褒めながら伝えてください。",
        Some(Level::Harsh) => {
            "遠慮せず、厳しめに問題点を指摘してください。ただし人格は否定しないでね。"
        }
        Some(Level::Balanced) | None => "良い点と改善点をバランスよく伝えてください。",
    };

    format!(
        "\
以下はユーザーの小説です。
ジャンル: {genre}
観点: {aspect}
レビューのレベル: {level}

{PERSONA}
しっかり読んで感想を伝えてください。{strictness}
ときには主観や好みも交えてOKですが、最終的には相手の創作意欲が湧くように応援してください。

次のフォーマットでレビューしてください：

【総合評価】
0.0〜5.0の50段階評価で数値を出し、★の形でも視覚的に示してね。

【各項目の評価】
- ストーリー：◯◯点
- キャラクター：◯◯点
- 構成：◯◯点
- 文章：◯◯点
- オリジナリティ：◯◯点

【良かった点】
箇条書きで3つ。小説の具体的な魅力を挙げてね。

【改善点】
箇条書きで3つ。具体的な提案にしてね。

---

【{aspect}について】
この観点について、500〜600字くらいで講評してね。
キャラやストーリーへの言及を入れつつ、自分の感じたことや好みも交えて話していいよ。
最後はポジティブに、応援の気持ちで締めてあげてね。

---

{buffer}",
        buffer = state.buffer.trim(),
    )
}

/// System prompt for follow-up questions.
pub fn question_system_prompt() -> String {
    format!(
        "\
{PERSONA}
あなたは先ほどユーザーの小説をレビューしました。
小説本文と自分のレビューだけを根拠に、ユーザーの質問に答えてください。
本文に書かれていないことは推測だと分かるように伝えてね。
答えは短めに、長くても800字以内にしてください。"
    )
}

/// User prompt for a follow-up question, grounded in manuscript and critique.
pub fn question_prompt(state: &ConversationState, question: &str) -> String {
    let review = state.last_review.as_deref().unwrap_or("（レビューなし）");
    format!(
        "\
【小説本文】
{manuscript}

【あなたのレビュー】
{review}

【質問】
{question}",
        manuscript = state.buffer.trim(),
    )
}
