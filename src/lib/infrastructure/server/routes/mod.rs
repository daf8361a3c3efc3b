pub mod answer;
pub mod entities;
pub mod health;
