pub mod mw_session;
