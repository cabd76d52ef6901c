mod health_tests;
mod mention_tests;
mod message_tests;
mod user_tests;
