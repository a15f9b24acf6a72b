pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod screen;
pub mod session;

pub use api::{
    FilterChange, HttpApi, MarketApi, PluginFilters, PriceFilter, SortKey, MINECRAFT_VERSIONS,
    PLUGIN_CATEGORIES,
};
pub use config::Config;
pub use error::{BazaarError, ErrorKind, Result};
pub use models::{
    time_ago, CategoryRef, ForumCategory, Plugin, PluginVersion, ProfileUpdate, Registration,
    Reply, Review, Topic, Upload, User, UserRef,
};
pub use session::{FileTokenStore, MemoryTokenStore, SessionEvent, SessionHolder, TokenStore};

// Screens
pub use screen::{
    AppContext, CreatePluginScreen, DownloadedJar, ForumIndex, ForumIndexScreen, HomeScreen,
    LikeOverlay, Loadable, NavbarState, Navigator, NewTopicForm, NewTopicScreen, Notice,
    NoticeLevel, Notifier, PasswordForm, PluginBrowser, PluginDetailScreen, PluginForm,
    ProfileScreen, ProfileView, ReviewsScreen, Route, ScreenScope, SettingsScreen, SubmitState,
    TopicScreen, TopicView,
};
