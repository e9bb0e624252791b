//! Mappers - convert between database models and domain entities

mod tracked_message;
