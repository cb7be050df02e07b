//! 页面状态分类单元测试
//!
//! 覆盖范围:
//! 1. 限流 > 错误页 > 登录墙 的错误信息优先级
//! 2. 多语言短语
//! 3. 多个标志同时成立时的信息
//! 4. 空页面与 hasMainContent 的独立性

use threads_scraper::services::page_classifier::classify_html;

// ============================================================================
// 1. 优先级
// ============================================================================

#[test]
fn test_classify_错误页优先于登录墙() {
    let html = r#"<body><main><div>
        <p>Something went wrong</p>
        <button>Log in</button>
    </div></main></body>"#;
    let state = classify_html(html);

    assert!(state.is_error_page);
    assert!(state.is_login_wall);
    assert!(!state.is_rate_limited);
    assert!(state.error_message.starts_with("error page"));
}

#[test]
fn test_classify_不存在页面带登录链接() {
    let html = r#"<body><main><div>
        <a href="/login">Log in</a>
        <p>Sorry, this page isn't available.</p>
    </div></main></body>"#;
    let state = classify_html(html);

    assert!(state.is_error_page);
    assert!(state.is_not_found);
    assert!(state.is_login_wall);
    assert!(state.error_message.starts_with("error page"));
}

#[test]
fn test_classify_空页面带登录链接() {
    let html = r#"<body><main><div><a href="/login">Log in</a></div></main></body>"#;
    let state = classify_html(html);

    assert!(state.is_empty);
    assert!(state.is_login_wall);
    assert!(!state.is_error_page);
    assert_eq!(state.error_message, "login wall: \"Log in\"");
}

#[test]
fn test_classify_登录按钮() {
    let html = r#"<body><main><div><a href="/login">登入</a></div></main></body>"#;
    let state = classify_html(html);

    assert!(state.is_login_wall);
    assert!(!state.is_error_page);
    assert_eq!(state.error_message, "login wall: \"登入\"");
}

#[test]
fn test_classify_长段落中的登录字样不算按钮() {
    let html = r#"<body><main><div>
        <a href="/@alice/post/C1">post</a>
        <button>You can log in later to follow accounts and see more posts from people you like</button>
    </div></main></body>"#;
    let state = classify_html(html);

    assert!(!state.is_login_wall);
}

// ============================================================================
// 2. 多语言
// ============================================================================

#[test]
fn test_classify_中文限流() {
    let state = classify_html("<body><main><p>請稍後再試</p></main></body>");
    assert!(state.is_rate_limited);
    assert!(state.is_blocked());
}

#[test]
fn test_classify_日文错误页() {
    let state = classify_html("<body><main><p>問題が発生しました</p></main></body>");
    assert!(state.is_error_page);
    assert!(!state.is_not_found);
}

#[test]
fn test_classify_脚本中的短语不计入() {
    let html = r#"<body><script>var msg = "too many requests";</script>
        <main><div><a href="/@alice/post/C1">post</a></div></main></body>"#;
    let state = classify_html(html);
    assert!(!state.is_rate_limited);
}

// ============================================================================
// 3. 空页面
// ============================================================================

#[test]
fn test_classify_没有主区域即为空() {
    let state = classify_html("<body><div>nothing</div></body>");
    assert!(state.is_empty);
    assert!(!state.has_main_content);
}

#[test]
fn test_classify_主区域文本充足但无帖子不算空() {
    let html = r#"<body><main><div>
        This search page has a long explanatory paragraph that easily exceeds fifty characters.
    </div></main></body>"#;
    let state = classify_html(html);

    assert!(state.has_main_content);
    assert!(!state.is_empty);
    assert_eq!(state.post_link_count, 0);
}

#[test]
fn test_classify_空主区域() {
    let state = classify_html("<body><main></main></body>");
    assert!(!state.has_main_content);
    assert!(state.is_empty);
}
