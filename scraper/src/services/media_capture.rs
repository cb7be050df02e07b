//! 媒体URL捕获
//!
//! 帖子中的视频常以 blob: 地址渲染,真实地址只出现在网络响应里。
//! `MediaCapture` 归单个采集任务所有,只接收该任务文档排出的响应,
//! 在抽取时按顺序分配给缺少可用地址的视频和图片。

use std::collections::HashSet;

use crate::services::document::NetworkResponse;

/// 媒体CDN主机后缀
const MEDIA_CDN_HOSTS: &[&str] = &["cdninstagram.com", "fbcdn.net"];

/// 头像尺寸/路径标记
const PROFILE_PICTURE_MARKERS: &[&str] = &["s150x150", "/t51.2885-19/"];

/// 单任务媒体捕获
#[derive(Debug, Default)]
pub struct MediaCapture {
    images: Vec<String>,
    videos: Vec<String>,
    seen: HashSet<String>,
    next_image: usize,
    next_video: usize,
}

impl MediaCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// 接收一批网络响应
    ///
    /// 返回新增的媒体URL数量
    pub fn ingest<I>(&mut self, responses: I) -> usize
    where
        I: IntoIterator<Item = NetworkResponse>,
    {
        let mut added = 0;
        for response in responses {
            if self.seen.contains(&response.url) {
                continue;
            }

            let content_type = response.content_type.to_ascii_lowercase();
            if content_type.starts_with("video/") || is_mp4_url(&response.url) {
                self.seen.insert(response.url.clone());
                self.videos.push(response.url);
                added += 1;
            } else if content_type.starts_with("image/")
                && is_media_cdn(&response.url)
                && !is_profile_picture_url(&response.url)
            {
                self.seen.insert(response.url.clone());
                self.images.push(response.url);
                added += 1;
            }
        }
        added
    }

    /// 取出下一个尚未分配的视频URL
    pub fn take_video(&mut self) -> Option<String> {
        let video = self.videos.get(self.next_video).cloned()?;
        self.next_video += 1;
        Some(video)
    }

    /// 取出下一个尚未分配的图片URL
    pub fn take_image(&mut self) -> Option<String> {
        let image = self.images.get(self.next_image).cloned()?;
        self.next_image += 1;
        Some(image)
    }

    /// 尚未分配的视频数量
    pub fn pending_videos(&self) -> usize {
        self.videos.len().saturating_sub(self.next_video)
    }

    pub fn pending_images(&self) -> usize {
        self.images.len().saturating_sub(self.next_image)
    }
}

/// 是否为平台媒体CDN地址
pub fn is_media_cdn(url: &str) -> bool {
    url::Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
        .is_some_and(|host| {
            MEDIA_CDN_HOSTS
                .iter()
                .any(|cdn| host == *cdn || host.ends_with(&format!(".{}", cdn)))
        })
}

/// 是否为头像尺寸的图片地址
pub fn is_profile_picture_url(url: &str) -> bool {
    PROFILE_PICTURE_MARKERS.iter().any(|marker| url.contains(marker))
}

/// 可直接使用的 http(s) 地址 (排除 blob:/data:)
pub fn is_resolvable(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

fn is_mp4_url(url: &str) -> bool {
    url.split('?')
        .next()
        .is_some_and(|path| path.to_ascii_lowercase().ends_with(".mp4"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_classifies_and_dedups() {
        let mut capture = MediaCapture::new();
        let added = capture.ingest(vec![
            NetworkResponse::new("https://scontent.cdninstagram.com/v/a.jpg", "image/jpeg"),
            NetworkResponse::new("https://scontent.cdninstagram.com/v/a.jpg", "image/jpeg"),
            NetworkResponse::new("https://video.fbcdn.net/v/clip.mp4?x=1", "application/octet-stream"),
            NetworkResponse::new("https://scontent.cdninstagram.com/v/t51.2885-19/me.jpg", "image/jpeg"),
            NetworkResponse::new("https://example.com/ad.png", "image/png"),
            NetworkResponse::new("https://www.threads.net/api/graphql", "application/json"),
        ]);

        assert_eq!(added, 2);
        assert_eq!(capture.pending_images(), 1);
        assert_eq!(capture.pending_videos(), 1);
        assert_eq!(
            capture.take_image().as_deref(),
            Some("https://scontent.cdninstagram.com/v/a.jpg")
        );
        assert_eq!(
            capture.take_video().as_deref(),
            Some("https://video.fbcdn.net/v/clip.mp4?x=1")
        );
        assert_eq!(capture.take_image(), None);
    }

    #[test]
    fn test_videos_are_handed_out_in_order() {
        let mut capture = MediaCapture::new();
        capture.ingest(vec![
            NetworkResponse::new("https://video.fbcdn.net/1.mp4", "video/mp4"),
            NetworkResponse::new("https://video.fbcdn.net/2.mp4", "video/mp4"),
        ]);

        assert_eq!(capture.take_video().as_deref(), Some("https://video.fbcdn.net/1.mp4"));
        assert_eq!(capture.pending_videos(), 1);
        assert_eq!(capture.take_video().as_deref(), Some("https://video.fbcdn.net/2.mp4"));
        assert_eq!(capture.take_video(), None);
    }

    #[test]
    fn test_separate_captures_do_not_share_state() {
        let mut first = MediaCapture::new();
        let second = MediaCapture::new();
        first.ingest(vec![NetworkResponse::new("https://video.fbcdn.net/1.mp4", "video/mp4")]);

        assert_eq!(first.pending_videos(), 1);
        assert_eq!(second.pending_videos(), 0);
    }
}
