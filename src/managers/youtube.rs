use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

use crate::constants::limits::{MAX_COMMENT_RESULTS, MAX_RESULTS};
use crate::constants::youtube::{
    CHANNEL_PARTS, DEFAULT_REGION, ENRICHED_FIELDS, MY_CHANNEL_PARTS, PLAYLIST_PARTS,
    RELEVANCE_LANGUAGE, SAFE_SEARCH, TRENDING_PARTS, VIDEO_PARTS,
};
use crate::errors::ToolError;
use crate::mcp::tools::Tool;
use crate::services::logger::Logger;
use crate::services::tool_executor::{ToolCall, ToolHandler};
use crate::services::upstream::{UpstreamApi, UpstreamRequest};
use crate::services::validation::Validation;

/// Maps each tool onto one or more YouTube Data API calls.
pub struct YouTubeManager {
    logger: Logger,
    validation: Validation,
    upstream: Arc<dyn UpstreamApi>,
}

enum Rating {
    Like,
    Dislike,
    Clear,
}

impl Rating {
    fn as_param(&self) -> &'static str {
        match self {
            Rating::Like => "like",
            Rating::Dislike => "dislike",
            Rating::Clear => "none",
        }
    }

    fn confirmation(&self, video_id: &str) -> String {
        match self {
            Rating::Like => format!("Successfully liked video {}", video_id),
            Rating::Dislike => format!("Successfully disliked video {}", video_id),
            Rating::Clear => format!("Successfully removed like from video {}", video_id),
        }
    }
}

impl YouTubeManager {
    pub fn new(logger: Logger, validation: Validation, upstream: Arc<dyn UpstreamApi>) -> Self {
        Self {
            logger: logger.child("youtube"),
            validation,
            upstream,
        }
    }

    async fn send(&self, request: UpstreamRequest) -> Result<Value, ToolError> {
        self.logger.debug(
            "YouTube request",
            Some(&json!({
                "method": request.method.as_str(),
                "endpoint": request.endpoint,
                "oauth": request.bearer_token().is_some(),
            })),
        );
        Ok(self.upstream.send(request).await?)
    }

    fn required(&self, args: &Value, key: &str) -> Result<String, ToolError> {
        self.validation.ensure_string(args.get(key), key, true)
    }

    fn optional(&self, args: &Value, key: &str) -> Result<Option<String>, ToolError> {
        self.validation.ensure_optional_string(args.get(key), key, true)
    }

    fn count(&self, args: &Value, fallback: u64, max: u64) -> Result<u64, ToolError> {
        self.validation
            .ensure_count(args.get("max_results"), "max_results", fallback, max)
    }

    fn choice(&self, args: &Value, key: &str, fallback: &str) -> Result<String, ToolError> {
        Ok(self
            .optional(args, key)?
            .unwrap_or_else(|| fallback.to_string()))
    }

    fn video_details_request(&self, video_ids: &str, token: Option<&str>) -> UpstreamRequest {
        UpstreamRequest::public("videos")
            .with_token(token)
            .param("part", VIDEO_PARTS)
            .param("id", video_ids)
    }

    fn my_channel_request(&self, token: Option<&str>) -> Result<UpstreamRequest, ToolError> {
        Ok(UpstreamRequest::authenticated(Method::GET, "channels", token)?
            .param("part", MY_CHANNEL_PARTS)
            .param("mine", "true"))
    }

    fn playlist_items_request(
        &self,
        playlist_id: &str,
        max_results: u64,
        token: Option<&str>,
    ) -> Result<UpstreamRequest, ToolError> {
        Ok(
            UpstreamRequest::authenticated(Method::GET, "playlistItems", token)?
                .param("part", PLAYLIST_PARTS)
                .param("playlistId", playlist_id)
                .param("maxResults", max_results),
        )
    }

    async fn search_videos(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::public("search")
            .with_token(token)
            .param("part", "snippet")
            .param("q", self.required(args, "query")?)
            .param("maxResults", self.count(args, 10, MAX_RESULTS)?)
            .param("type", "video")
            .param("order", self.choice(args, "order", "relevance")?)
            .param("regionCode", self.choice(args, "region_code", DEFAULT_REGION)?)
            .param("relevanceLanguage", RELEVANCE_LANGUAGE)
            .param("safeSearch", SAFE_SEARCH)
            .optional_param("pageToken", self.optional(args, "page_token")?);
        let mut results = self.send(request).await?;
        self.enrich_with_details(&mut results, token).await;
        Ok(results)
    }

    /// Merges statistics and contentDetails from one batched videos lookup into
    /// the search items. Items the lookup did not return are left untouched; a
    /// failed lookup leaves the whole result unenriched.
    async fn enrich_with_details(&self, results: &mut Value, token: Option<&str>) {
        let video_ids: Vec<String> = results
            .get("items")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(search_item_video_id).collect())
            .unwrap_or_default();
        if video_ids.is_empty() {
            return;
        }

        let request = self.video_details_request(&video_ids.join(","), token);
        let details = match self.send(request).await {
            Ok(details) => details,
            // Never fails the search: a failed lookup returns the items unenriched.
            Err(err) => {
                self.logger.warn(
                    "Video enrichment failed",
                    Some(&json!({ "videos": video_ids.len(), "error": err.message })),
                );
                return;
            }
        };

        let by_id: HashMap<&str, &Value> = details
            .get("items")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(|item| item.get("id").and_then(Value::as_str).map(|id| (id, item)))
                    .collect()
            })
            .unwrap_or_default();

        let Some(items) = results.get_mut("items").and_then(Value::as_array_mut) else {
            return;
        };
        for item in items.iter_mut() {
            let Some(video_id) = search_item_video_id(item) else {
                continue;
            };
            let Some(detail) = by_id.get(video_id.as_str()) else {
                continue;
            };
            let Some(fields) = item.as_object_mut() else {
                continue;
            };
            for key in ENRICHED_FIELDS {
                if let Some(value) = detail.get(*key) {
                    fields.insert((*key).to_string(), value.clone());
                }
            }
        }
    }

    async fn search_channels(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::public("search")
            .with_token(token)
            .param("part", "snippet")
            .param("q", self.required(args, "query")?)
            .param("maxResults", self.count(args, 10, MAX_RESULTS)?)
            .param("type", "channel")
            .param("order", "relevance");
        self.send(request).await
    }

    async fn trending_videos(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::public("videos")
            .with_token(token)
            .param("part", TRENDING_PARTS)
            .param("chart", "mostPopular")
            .param("regionCode", self.choice(args, "region_code", DEFAULT_REGION)?)
            .param("maxResults", self.count(args, 25, MAX_RESULTS)?)
            .optional_param("videoCategoryId", self.optional(args, "category_id")?);
        self.send(request).await
    }

    async fn video_details(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let video_id = self.required(args, "video_id")?;
        self.send(self.video_details_request(&video_id, token)).await
    }

    async fn video_comments(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::public("commentThreads")
            .with_token(token)
            .param("part", "snippet")
            .param("videoId", self.required(args, "video_id")?)
            .param("maxResults", self.count(args, 20, MAX_COMMENT_RESULTS)?)
            .param("order", self.choice(args, "order", "relevance")?)
            .param("textFormat", "plainText");
        self.send(request).await
    }

    async fn channel_details(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::public("channels")
            .with_token(token)
            .param("part", CHANNEL_PARTS)
            .param("id", self.required(args, "channel_id")?);
        self.send(request).await
    }

    async fn channel_videos(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::public("search")
            .with_token(token)
            .param("part", "snippet")
            .param("channelId", self.required(args, "channel_id")?)
            .param("maxResults", self.count(args, 10, MAX_RESULTS)?)
            .param("order", self.choice(args, "order", "date")?)
            .param("type", "video");
        self.send(request).await
    }

    async fn rate_video(
        &self,
        args: &Value,
        token: Option<&str>,
        rating: Rating,
    ) -> Result<Value, ToolError> {
        let video_id = self.required(args, "video_id")?;
        let request = UpstreamRequest::authenticated(Method::POST, "videos/rate", token)?
            .param("id", &video_id)
            .param("rating", rating.as_param());
        self.send(request).await?;
        Ok(json!({ "success": true, "message": rating.confirmation(&video_id) }))
    }

    async fn comment_on_video(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let video_id = self.required(args, "video_id")?;
        let text = self.validation.ensure_string(args.get("text"), "text", false)?;
        let request = UpstreamRequest::authenticated(Method::POST, "commentThreads", token)?
            .param("part", "snippet")
            .json_body(json!({
                "snippet": {
                    "videoId": video_id,
                    "topLevelComment": { "snippet": { "textOriginal": text } }
                }
            }));
        let created = self.send(request).await?;
        Ok(json!({
            "success": true,
            "message": "Comment posted successfully",
            "comment_id": created.get("id").cloned().unwrap_or(Value::Null),
        }))
    }

    async fn subscribe_channel(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let channel_id = self.required(args, "channel_id")?;
        let request = UpstreamRequest::authenticated(Method::POST, "subscriptions", token)?
            .param("part", "snippet")
            .json_body(json!({
                "snippet": {
                    "resourceId": { "kind": "youtube#channel", "channelId": channel_id }
                }
            }));
        let created = self.send(request).await?;
        Ok(json!({
            "success": true,
            "message": "Successfully subscribed to channel",
            "subscription_id": created.get("id").cloned().unwrap_or(Value::Null),
        }))
    }

    async fn unsubscribe_channel(
        &self,
        args: &Value,
        token: Option<&str>,
    ) -> Result<Value, ToolError> {
        let request = UpstreamRequest::authenticated(Method::DELETE, "subscriptions", token)?
            .param("id", self.required(args, "subscription_id")?);
        self.send(request).await?;
        Ok(json!({ "success": true, "message": "Successfully unsubscribed" }))
    }

    async fn my_subscriptions(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::authenticated(Method::GET, "subscriptions", token)?
            .param("part", "snippet,contentDetails")
            .param("mine", "true")
            .param("maxResults", self.count(args, 50, MAX_RESULTS)?);
        self.send(request).await
    }

    async fn create_playlist(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let title = self.required(args, "title")?;
        let description = self
            .validation
            .text_or_default(args.get("description"), "description", "")?;
        let privacy = self.choice(args, "privacy", "private")?;
        let request = UpstreamRequest::authenticated(Method::POST, "playlists", token)?
            .param("part", "snippet,status")
            .json_body(json!({
                "snippet": { "title": title, "description": description },
                "status": { "privacyStatus": privacy }
            }));
        let created = self.send(request).await?;
        Ok(json!({
            "success": true,
            "playlist_id": created.get("id").cloned().unwrap_or(Value::Null),
            "title": title,
        }))
    }

    async fn my_playlists(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::authenticated(Method::GET, "playlists", token)?
            .param("part", PLAYLIST_PARTS)
            .param("mine", "true")
            .param("maxResults", self.count(args, 50, MAX_RESULTS)?);
        self.send(request).await
    }

    async fn add_to_playlist(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let playlist_id = self.required(args, "playlist_id")?;
        let video_id = self.required(args, "video_id")?;
        let request = UpstreamRequest::authenticated(Method::POST, "playlistItems", token)?
            .param("part", "snippet")
            .json_body(json!({
                "snippet": {
                    "playlistId": playlist_id,
                    "resourceId": { "kind": "youtube#video", "videoId": video_id }
                }
            }));
        let created = self.send(request).await?;
        Ok(json!({
            "success": true,
            "message": "Video added to playlist",
            "item_id": created.get("id").cloned().unwrap_or(Value::Null),
        }))
    }

    async fn remove_from_playlist(
        &self,
        args: &Value,
        token: Option<&str>,
    ) -> Result<Value, ToolError> {
        let request = UpstreamRequest::authenticated(Method::DELETE, "playlistItems", token)?
            .param("id", self.required(args, "playlist_item_id")?);
        self.send(request).await?;
        Ok(json!({ "success": true, "message": "Video removed from playlist" }))
    }

    async fn playlist_videos(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let playlist_id = self.required(args, "playlist_id")?;
        let max_results = self.count(args, 50, MAX_RESULTS)?;
        let request = self.playlist_items_request(&playlist_id, max_results, token)?;
        self.send(request).await
    }

    async fn my_channel(&self, token: Option<&str>) -> Result<Value, ToolError> {
        let request = self.my_channel_request(token)?;
        self.send(request).await
    }

    async fn watch_history(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let request = UpstreamRequest::authenticated(Method::GET, "activities", token)?
            .param("part", "snippet,contentDetails")
            .param("mine", "true")
            .param("maxResults", self.count(args, 50, MAX_RESULTS)?);
        self.send(request).await
    }

    async fn liked_videos(&self, args: &Value, token: Option<&str>) -> Result<Value, ToolError> {
        let max_results = self.count(args, 50, MAX_RESULTS)?;
        let channel = self.my_channel(token).await?;
        let Some(first) = channel
            .get("items")
            .and_then(Value::as_array)
            .and_then(|items| items.first())
        else {
            return Ok(json!({ "items": [], "message": "No channel found" }));
        };
        let likes = first
            .pointer("/contentDetails/relatedPlaylists/likes")
            .and_then(Value::as_str)
            .filter(|id| !id.trim().is_empty());
        let Some(likes) = likes else {
            return Ok(json!({ "items": [], "message": "Likes playlist not found" }));
        };
        let request = self.playlist_items_request(likes, max_results, token)?;
        self.send(request).await
    }
}

fn search_item_video_id(item: &Value) -> Option<String> {
    item.pointer("/id/videoId")
        .and_then(Value::as_str)
        .map(str::to_string)
}

#[async_trait]
impl ToolHandler for YouTubeManager {
    async fn handle(&self, call: ToolCall) -> Result<Value, ToolError> {
        let args = &call.args;
        let token = call.token.as_deref();
        match call.tool {
            Tool::SearchVideos => self.search_videos(args, token).await,
            Tool::SearchChannels => self.search_channels(args, token).await,
            Tool::TrendingVideos => self.trending_videos(args, token).await,
            Tool::VideoDetails => self.video_details(args, token).await,
            Tool::VideoComments => self.video_comments(args, token).await,
            Tool::ChannelDetails => self.channel_details(args, token).await,
            Tool::ChannelVideos => self.channel_videos(args, token).await,
            Tool::LikeVideo => self.rate_video(args, token, Rating::Like).await,
            Tool::UnlikeVideo => self.rate_video(args, token, Rating::Clear).await,
            Tool::DislikeVideo => self.rate_video(args, token, Rating::Dislike).await,
            Tool::CommentOnVideo => self.comment_on_video(args, token).await,
            Tool::SubscribeChannel => self.subscribe_channel(args, token).await,
            Tool::UnsubscribeChannel => self.unsubscribe_channel(args, token).await,
            Tool::MySubscriptions => self.my_subscriptions(args, token).await,
            Tool::CreatePlaylist => self.create_playlist(args, token).await,
            Tool::MyPlaylists => self.my_playlists(args, token).await,
            Tool::AddToPlaylist => self.add_to_playlist(args, token).await,
            Tool::RemoveFromPlaylist => self.remove_from_playlist(args, token).await,
            Tool::PlaylistVideos => self.playlist_videos(args, token).await,
            Tool::MyChannel => self.my_channel(token).await,
            Tool::WatchHistory => self.watch_history(args, token).await,
            Tool::LikedVideos => self.liked_videos(args, token).await,
        }
    }
}
