/// Whether a tool may run without the caller's OAuth token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Runs on the server API key; a caller token is forwarded when present.
    Optional,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tool {
    SearchVideos,
    SearchChannels,
    TrendingVideos,
    VideoDetails,
    VideoComments,
    ChannelDetails,
    ChannelVideos,
    LikeVideo,
    UnlikeVideo,
    DislikeVideo,
    CommentOnVideo,
    SubscribeChannel,
    UnsubscribeChannel,
    MySubscriptions,
    CreatePlaylist,
    MyPlaylists,
    AddToPlaylist,
    RemoveFromPlaylist,
    PlaylistVideos,
    MyChannel,
    WatchHistory,
    LikedVideos,
}

impl Tool {
    pub const ALL: [Tool; 22] = [
        Tool::SearchVideos,
        Tool::SearchChannels,
        Tool::TrendingVideos,
        Tool::VideoDetails,
        Tool::VideoComments,
        Tool::ChannelDetails,
        Tool::ChannelVideos,
        Tool::LikeVideo,
        Tool::UnlikeVideo,
        Tool::DislikeVideo,
        Tool::CommentOnVideo,
        Tool::SubscribeChannel,
        Tool::UnsubscribeChannel,
        Tool::MySubscriptions,
        Tool::CreatePlaylist,
        Tool::MyPlaylists,
        Tool::AddToPlaylist,
        Tool::RemoveFromPlaylist,
        Tool::PlaylistVideos,
        Tool::MyChannel,
        Tool::WatchHistory,
        Tool::LikedVideos,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Tool::SearchVideos => "search_videos",
            Tool::SearchChannels => "search_channels",
            Tool::TrendingVideos => "trending_videos",
            Tool::VideoDetails => "video_details",
            Tool::VideoComments => "video_comments",
            Tool::ChannelDetails => "channel_details",
            Tool::ChannelVideos => "channel_videos",
            Tool::LikeVideo => "like_video",
            Tool::UnlikeVideo => "unlike_video",
            Tool::DislikeVideo => "dislike_video",
            Tool::CommentOnVideo => "comment_on_video",
            Tool::SubscribeChannel => "subscribe_channel",
            Tool::UnsubscribeChannel => "unsubscribe_channel",
            Tool::MySubscriptions => "my_subscriptions",
            Tool::CreatePlaylist => "create_playlist",
            Tool::MyPlaylists => "my_playlists",
            Tool::AddToPlaylist => "add_to_playlist",
            Tool::RemoveFromPlaylist => "remove_from_playlist",
            Tool::PlaylistVideos => "playlist_videos",
            Tool::MyChannel => "my_channel",
            Tool::WatchHistory => "watch_history",
            Tool::LikedVideos => "liked_videos",
        }
    }

    pub fn from_name(name: &str) -> Option<Tool> {
        Tool::ALL.iter().copied().find(|tool| tool.name() == name)
    }

    pub fn auth(self) -> AuthPolicy {
        match self {
            Tool::SearchVideos
            | Tool::SearchChannels
            | Tool::TrendingVideos
            | Tool::VideoDetails
            | Tool::VideoComments
            | Tool::ChannelDetails
            | Tool::ChannelVideos => AuthPolicy::Optional,
            _ => AuthPolicy::Required,
        }
    }

    pub fn requires_auth(self) -> bool {
        self.auth() == AuthPolicy::Required
    }
}
