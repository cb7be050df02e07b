//! 多语言短语表
//!
//! 页面分类和按钮标签识别都由数据驱动: 语言标签 → 短语列表。
//! 新增语言或平台改版时只需修改这里的表。
//! 所有短语以小写存储,匹配时对输入做小写化。

/// 语言标签 → 短语列表
pub type PhraseTable = &'static [(&'static str, &'static [&'static str])];

/// 限流提示
pub const RATE_LIMIT: PhraseTable = &[
    (
        "en",
        &[
            "rate limit",
            "too many requests",
            "try again later",
            "please wait a few minutes",
        ],
    ),
    ("zh-TW", &["請稍後再試", "要求次數過多", "太多要求"]),
    ("zh-CN", &["请稍后再试", "请求过于频繁"]),
    ("ja", &["しばらくしてから", "リクエストが多すぎます"]),
    ("ko", &["잠시 후 다시 시도", "요청이 너무 많습니다"]),
];

/// 通用错误页
pub const ERROR_PAGE: PhraseTable = &[
    (
        "en",
        &[
            "something went wrong",
            "this page isn't available",
            "page not found",
            "sorry, this page",
            "an error occurred",
        ],
    ),
    ("zh-TW", &["發生錯誤", "無法使用此頁面", "找不到頁面", "出了點問題"]),
    ("zh-CN", &["出错了", "出了点问题", "无法使用此页面", "页面不存在"]),
    ("ja", &["問題が発生しました", "このページはご利用いただけません"]),
    ("ko", &["문제가 발생했습니다", "페이지를 사용할 수 없습니다"]),
];

/// 错误页中表示"目标不存在/不可用"的子集
pub const NOT_FOUND: PhraseTable = &[
    (
        "en",
        &["this page isn't available", "page not found", "user not found"],
    ),
    ("zh-TW", &["無法使用此頁面", "找不到頁面", "找不到用戶"]),
    ("zh-CN", &["无法使用此页面", "页面不存在", "用户不存在"]),
    ("ja", &["このページはご利用いただけません"]),
    ("ko", &["페이지를 사용할 수 없습니다"]),
];

/// 登录按钮/链接
pub const LOGIN: PhraseTable = &[
    (
        "en",
        &["log in", "login", "sign in", "continue with instagram"],
    ),
    ("zh-TW", &["登入", "使用 instagram 帳號繼續"]),
    ("zh-CN", &["登录", "使用 instagram 账号继续"]),
    ("ja", &["ログイン"]),
    ("ko", &["로그인"]),
];

/// 赞
pub const LIKE: PhraseTable = &[
    ("en", &["like", "likes", "unlike"]),
    ("zh-TW", &["讚", "收回讚"]),
    ("zh-CN", &["赞", "取消赞"]),
    ("ja", &["いいね"]),
    ("ko", &["좋아요"]),
];

/// 回复/评论
pub const REPLY: PhraseTable = &[
    ("en", &["reply", "replies", "comment", "comments"]),
    ("zh-TW", &["回覆", "留言"]),
    ("zh-CN", &["回复", "评论"]),
    ("ja", &["返信", "コメント"]),
    ("ko", &["답글", "댓글"]),
];

/// 转发
pub const REPOST: PhraseTable = &[
    ("en", &["repost", "reposts", "quote"]),
    ("zh-TW", &["轉發", "轉貼", "引用"]),
    ("zh-CN", &["转发", "转帖", "引用"]),
    ("ja", &["再投稿", "引用"]),
    ("ko", &["리포스트", "인용"]),
];

/// 分享
pub const SHARE: PhraseTable = &[
    ("en", &["share"]),
    ("zh-TW", &["分享"]),
    ("zh-CN", &["分享"]),
    ("ja", &["シェア"]),
    ("ko", &["공유"]),
];

/// 翻译/了解更多 等尾部界面残留
pub const TRAILING_UI: PhraseTable = &[
    ("en", &["translate", "see translation", "learn more", "more"]),
    ("zh-TW", &["翻譯", "查看翻譯", "瞭解詳情", "更多"]),
    ("zh-CN", &["翻译", "查看翻译", "了解更多", "更多"]),
    ("ja", &["翻訳を見る", "詳しくはこちら"]),
    ("ko", &["번역 보기", "더 알아보기"]),
];

/// "刚刚"
pub const JUST_NOW: PhraseTable = &[
    ("en", &["just now", "now"]),
    ("zh-TW", &["剛剛", "剛才"]),
    ("zh-CN", &["刚刚", "刚才"]),
    ("ja", &["たった今"]),
    ("ko", &["방금"]),
];

/// 粉丝数
pub const FOLLOWERS: PhraseTable = &[
    ("en", &["followers", "follower"]),
    ("zh-TW", &["位粉絲", "粉絲"]),
    ("zh-CN", &["位粉丝", "粉丝"]),
    ("ja", &["フォロワー"]),
    ("ko", &["팔로워"]),
];

/// 认证标识
pub const VERIFIED: PhraseTable = &[
    ("en", &["verified"]),
    ("zh-TW", &["已驗證"]),
    ("zh-CN", &["已验证"]),
    ("ja", &["認証済み"]),
    ("ko", &["인증됨"]),
];

/// 头像图片的 alt 文本
pub const PROFILE_PICTURE: PhraseTable = &[
    ("en", &["profile picture"]),
    ("zh-TW", &["大頭貼照"]),
    ("zh-CN", &["头像"]),
    ("ja", &["プロフィール写真"]),
    ("ko", &["프로필 사진"]),
];

/// 遍历表中所有短语
pub fn all(table: PhraseTable) -> impl Iterator<Item = &'static str> {
    table.iter().flat_map(|(_, phrases)| phrases.iter().copied())
}

/// 文本中是否包含任一短语 (大小写不敏感的子串匹配),返回命中的短语
pub fn find_in(text: &str, table: PhraseTable) -> Option<&'static str> {
    let lower = text.to_lowercase();
    all(table).find(|phrase| lower.contains(phrase))
}

/// 文本是否恰好等于某个短语 (忽略首尾空白与大小写)
pub fn equals_any(text: &str, table: PhraseTable) -> bool {
    let lower = text.trim().to_lowercase();
    !lower.is_empty() && all(table).any(|phrase| lower == phrase)
}

/// 文本是否以某个短语作为完整的标签词出现
///
/// 用于按钮标签识别: "讚 2,049"、"Like"、"12 replies" 都应命中,
/// 但 "likewise" 不应命中 "like"。
pub fn label_matches(text: &str, table: PhraseTable) -> bool {
    let lower = text.to_lowercase();
    all(table).any(|phrase| contains_word(&lower, phrase))
}

/// 子串出现且两侧不是ASCII字母 (CJK短语天然满足)
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(|c| c.is_ascii_alphabetic())
            && !after.is_some_and(|c| c.is_ascii_alphabetic())
    })
}
