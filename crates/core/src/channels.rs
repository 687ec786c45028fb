//! Marketing channel catalog.
//!
//! A [`Channel`] is one of the distribution surfaces a content draft can
//! target. Channel names travel as lowercase strings in the API and in the
//! `contents.channel` / `advertisers.channels` columns; this enum is the
//! single place that validates them.

use serde::{Deserialize, Serialize};

/// A supported distribution channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Instagram,
    Blog,
    Threads,
    Youtube,
}

/// All channels in catalog order.
pub const ALL_CHANNELS: [Channel; 4] = [
    Channel::Instagram,
    Channel::Blog,
    Channel::Threads,
    Channel::Youtube,
];

impl Channel {
    /// Canonical lowercase name stored in the database.
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Instagram => "instagram",
            Channel::Blog => "blog",
            Channel::Threads => "threads",
            Channel::Youtube => "youtube",
        }
    }

    /// Parse a channel name. Case-insensitive.
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "instagram" => Some(Channel::Instagram),
            "blog" => Some(Channel::Blog),
            "threads" => Some(Channel::Threads),
            "youtube" => Some(Channel::Youtube),
            _ => None,
        }
    }

    /// Per-channel drafting guideline appended to generation prompts.
    ///
    /// Keeps channel knowledge out of the templates themselves so one
    /// planning input can fan out per channel (OSMU).
    pub fn generation_hint(self) -> &'static str {
        match self {
            Channel::Instagram => {
                "인스타그램 피드 게시물. 첫 문장으로 시선을 끌고, 본문은 700자 이내, \
                 해시태그 5~10개를 제안할 것."
            }
            Channel::Blog => {
                "블로그 포스트. 소제목을 포함한 1,500자 내외의 정보성 글. \
                 검색 키워드를 제목과 첫 문단에 자연스럽게 포함할 것."
            }
            Channel::Threads => {
                "스레드 게시물. 대화하듯 가벼운 톤으로 500자 이내. 해시태그는 최대 2개."
            }
            Channel::Youtube => {
                "유튜브 커뮤니티/쇼츠 스크립트. 도입 후킹 멘트와 30초 분량의 \
                 구어체 대본, 영상 설명 문구를 포함할 것."
            }
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
