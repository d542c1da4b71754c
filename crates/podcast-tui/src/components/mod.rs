pub mod details;
pub mod episode_list;
pub mod header;
pub mod help_overlay;
pub mod podcast_list;
pub mod station_list;
