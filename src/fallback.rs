//! # Offline Tutor
//!
//! This module answers tutor requests when the hosted model is unavailable,
//! typically because no API key is configured.
//!
//! ## Model Characteristics
//!
//! - **Explanations**: one short, hand-written paragraph per phase bucket,
//!   looked up by the bucket's short Japanese name
//! - **Quiz**: a fixed pool of questions about the phase cycle
//! - **Chat**: a single canned reply pointing at the offline state
//!
//! ### Accuracy Trade-offs
//! - ✅ **Always available**: no network, no key, no latency
//! - ✅ **Same interface**: callers cannot tell which tutor answered
//! - ❌ **No conversation**: chat does not look at the message

use crate::phase::PhaseBucket;
use crate::quiz::QuizQuestion;
use crate::tutor::Tutor;

/// Reply used for every chat message while offline.
pub const OFFLINE_CHAT: &str =
    "いまはインターネットにつながっていないみたい。つながったら、もう一回きいてね！";

/// Tutor that answers from built-in text.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineTutor;

/// Built-in explanation for a phase bucket.
pub fn explanation_for(bucket: PhaseBucket) -> &'static str {
    match bucket {
        PhaseBucket::New => {
            "新月は、月が太陽と地球のあいだにいるときだよ。光っている面が太陽のほうを向いているから、地球からは月がほとんど見えないんだ。"
        }
        PhaseBucket::WaxingCrescent => {
            "三日月は、夕方の西の空に見える細い月だよ。右がわが少しだけ光っていて、これから毎日ふくらんでいくよ。"
        }
        PhaseBucket::FirstQuarter => {
            "上弦の月は、右半分が光っている月だよ。月が地球のまわりを四分の一まわったところで、夕方に南の空に見えるよ。"
        }
        PhaseBucket::WaxingGibbous => {
            "十三夜の月は、満月の少し前のふっくらした月だよ。昔の人はこの月もお月見をして楽しんだんだって。"
        }
        PhaseBucket::Full => {
            "満月は、月が地球をはさんで太陽の反対がわにいるときだよ。太陽の光をまっすぐ受けた面がぜんぶ見えるから、まんまるに光るんだ。"
        }
        PhaseBucket::WaningGibbous => {
            "更待月は、満月のあとに少しずつ左がわへ欠けていく月だよ。夜がふけてからのぼってくるから、この名前がついたんだ。"
        }
        PhaseBucket::LastQuarter => {
            "下弦の月は、左半分が光っている月だよ。真夜中にのぼって、朝の南の空で見ることができるよ。"
        }
        PhaseBucket::WaningCrescent => {
            "有明の月は、夜明けの東の空にうかぶ細い月だよ。左がわだけが光っていて、もうすぐ新月にもどるよ。"
        }
    }
}

fn q(question: &str, options: [&str; 3], correct: usize, explanation: &str) -> QuizQuestion {
    QuizQuestion {
        question: question.to_string(),
        options: options.iter().map(|o| o.to_string()).collect(),
        correct_answer_index: correct,
        explanation: explanation.to_string(),
    }
}

fn builtin_quiz() -> Vec<QuizQuestion> {
    vec![
        q(
            "月が光って見えるのはなぜかな？",
            ["月が自分で光っているから", "太陽の光をはね返しているから", "星の光をあつめているから"],
            1,
            "月は自分では光らないよ。太陽の光が当たったところだけが明るく見えるんだ。",
        ),
        q(
            "満月のとき、月はどこにあるかな？",
            ["太陽と地球のあいだ", "地球をはさんで太陽の反対がわ", "太陽のすぐとなり"],
            1,
            "月が太陽の反対がわにいると、光っている面がぜんぶ地球を向くよ。",
        ),
        q(
            "新月から満月になるまで、だいたい何日かかるかな？",
            ["約3日", "約15日", "約30日"],
            1,
            "月の満ち欠けはひとまわり約29.5日。その半分の約15日で満月になるよ。",
        ),
        q(
            "夕方の空で右半分が光っている月を何というかな？",
            ["上弦の月", "下弦の月", "有明の月"],
            0,
            "右半分が光る半月は上弦の月。左半分が光る半月は下弦の月だよ。",
        ),
    ]
}

impl Tutor for OfflineTutor {
    async fn explain(&self, topic: &str) -> String {
        let bucket = PhaseBucket::ALL
            .into_iter()
            .find(|b| topic.contains(b.short_name()))
            .unwrap_or(PhaseBucket::Full);
        explanation_for(bucket).to_string()
    }

    async fn quiz(&self, count: usize) -> Vec<QuizQuestion> {
        builtin_quiz().into_iter().take(count).collect()
    }

    async fn chat(&self, _message: &str) -> String {
        OFFLINE_CHAT.to_string()
    }
}
