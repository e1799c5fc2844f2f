pub mod live_session_reminder;
