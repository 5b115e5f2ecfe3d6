//! Fixed user-facing messages and their quick-reply buttons.

use crate::channels::{OutgoingMessage, QuickReply};

use super::catalog::{
    Aspect, CANCEL_KEYWORD, CONFIRM_REVIEW_KEYWORD, Genre, Level, NO_KEYWORD, RESET_KEYWORD,
    YES_KEYWORD,
};

fn reset_button() -> QuickReply {
    QuickReply::echo(RESET_KEYWORD)
}

fn with_reset(mut buttons: Vec<QuickReply>) -> Vec<QuickReply> {
    buttons.push(reset_button());
    buttons
}

fn genre_buttons() -> Vec<QuickReply> {
    Genre::ALL.iter().map(|g| QuickReply::echo(g.label())).collect()
}

fn level_buttons() -> Vec<QuickReply> {
    with_reset(Level::ALL.iter().map(|l| QuickReply::echo(l.label())).collect())
}

fn aspect_buttons() -> Vec<QuickReply> {
    with_reset(Aspect::ALL.iter().map(|a| QuickReply::echo(a.label())).collect())
}

fn yes_no_buttons() -> Vec<QuickReply> {
    with_reset(vec![QuickReply::echo(YES_KEYWORD), QuickReply::echo(NO_KEYWORD)])
}

fn overflow_buttons() -> Vec<QuickReply> {
    with_reset(vec![
        QuickReply::new(YES_KEYWORD, CONFIRM_REVIEW_KEYWORD),
        QuickReply::new(NO_KEYWORD, CANCEL_KEYWORD),
    ])
}

const CHOOSE_BUTTON: &str = "ボタンを選択してください：";

pub fn genre_prompt() -> OutgoingMessage {
    OutgoingMessage::text("ジャンルを選んでください：").with_quick_replies(genre_buttons())
}

/// Greeting for a first-time user.
pub fn welcome(display_name: Option<&str>) -> OutgoingMessage {
    let text = match display_name {
        Some(name) => format!("{name}さん、はじめまして！あなたの小説を読んでレビューするね。\nジャンルを選んでください："),
        None => "はじめまして！あなたの小説を読んでレビューするね。\nジャンルを選んでください：".to_string(),
    };
    OutgoingMessage::text(text).with_quick_replies(genre_buttons())
}

pub fn genre_invalid() -> OutgoingMessage {
    OutgoingMessage::text(CHOOSE_BUTTON).with_quick_replies(with_reset(genre_buttons()))
}

pub fn level_prompt() -> OutgoingMessage {
    OutgoingMessage::text("レビューのレベルを選んでください：").with_quick_replies(level_buttons())
}

pub fn level_invalid() -> OutgoingMessage {
    OutgoingMessage::text(CHOOSE_BUTTON).with_quick_replies(level_buttons())
}

pub fn aspect_prompt() -> OutgoingMessage {
    OutgoingMessage::text("レビューの観点を選んでください：").with_quick_replies(aspect_buttons())
}

pub fn aspect_invalid() -> OutgoingMessage {
    OutgoingMessage::text(CHOOSE_BUTTON).with_quick_replies(aspect_buttons())
}

pub fn request_text(min_chars: usize) -> OutgoingMessage {
    OutgoingMessage::text(format!("あなたの小説を送ってください（{min_chars}字以上）。"))
}

pub fn too_short(min_chars: usize, current: usize) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "{min_chars}字以上で送信するようにしてください。（現在{current}字）"
    ))
}

pub fn overflow_confirm(max_chars: usize) -> OutgoingMessage {
    OutgoingMessage::text(format!(
        "最大文字数（{max_chars}字）を超えたため、これ以上送れません。このままレビューしてもよろしいですか？"
    ))
    .with_quick_replies(overflow_buttons())
}

pub fn overflow_invalid() -> OutgoingMessage {
    OutgoingMessage::text("「はい」か「いいえ」を選んでください。このままレビューしてもよろしいですか？")
        .with_quick_replies(overflow_buttons())
}

pub fn cancelled() -> OutgoingMessage {
    OutgoingMessage::text("キャンセルされました。最初からやり直してください。")
}

pub fn continue_confirm() -> OutgoingMessage {
    OutgoingMessage::text("続きはありますか？").with_quick_replies(yes_no_buttons())
}

pub fn continue_invalid() -> OutgoingMessage {
    OutgoingMessage::text("「はい」か「いいえ」で答えてください。").with_quick_replies(yes_no_buttons())
}

pub fn send_more() -> OutgoingMessage {
    OutgoingMessage::text("続きを送ってください。")
}

pub fn review_ack() -> OutgoingMessage {
    OutgoingMessage::text("ありがとう！ 読ませてもらうね🌟")
}

pub fn review_closing() -> OutgoingMessage {
    OutgoingMessage::text(
        "質問があれば、何でも聞いてね！\n最初からやり直す場合は、「リセット」を選択してね。",
    )
    .with_quick_replies(vec![reset_button()])
}

pub fn no_content() -> OutgoingMessage {
    OutgoingMessage::text("レビュー内容が見つかりません。最初からやり直してください。")
}

pub fn review_failed() -> OutgoingMessage {
    OutgoingMessage::text(
        "レビューの生成中にエラーが出ました。文章が最大文字数をオーバーしたかもしれません。",
    )
    .with_quick_replies(vec![reset_button()])
}

pub fn review_empty() -> OutgoingMessage {
    OutgoingMessage::text("レビューの生成に失敗しました。「リセット」からもう一度やり直してください。")
        .with_quick_replies(vec![reset_button()])
}

/// Reply for text arriving after a generation that did not complete.
pub fn review_unfinished() -> OutgoingMessage {
    OutgoingMessage::text("レビューを完成できなかったみたい…「リセット」で最初からやり直してね。")
        .with_quick_replies(vec![reset_button()])
}

pub fn answer_failed() -> OutgoingMessage {
    OutgoingMessage::text("ごめんね、うまく答えられなかったみたい…もう一度聞いてみてね。")
}

pub fn unsupported_media() -> OutgoingMessage {
    OutgoingMessage::text("ごめんなさい、画像やスタンプ等は解析できないんです…")
}
