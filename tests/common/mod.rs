#![allow(dead_code)]

use async_trait::async_trait;
use blog_router::{
    AppConfig, AppState,
    models::{Article, ArticleInput, User},
    repository::{RepoError, Repository},
};
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub const TEST_JWT_SECRET: &str = "test-secret-value-1234567890";

// --- In-Memory Repository ---

// Keeps users and articles in insertion order so listings are deterministic.
#[derive(Default)]
pub struct MemoryRepo {
    users: Mutex<Vec<User>>,
    articles: Mutex<Vec<Article>>,
}

impl MemoryRepo {
    pub fn with_article(self, article: Article) -> Self {
        self.articles.lock().unwrap().push(article);
        self
    }
}

#[async_trait]
impl Repository for MemoryRepo {
    async fn get_user(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.username == username).cloned())
    }

    async fn create_user(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.username == user.username) {
            return Err(RepoError::Conflict);
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn get_public_articles(&self) -> Result<Vec<Article>, RepoError> {
        let articles = self.articles.lock().unwrap();
        Ok(articles.iter().filter(|a| !a.private).cloned().collect())
    }

    async fn get_public_articles_by(&self, username: &str) -> Result<Vec<Article>, RepoError> {
        let articles = self.articles.lock().unwrap();
        Ok(articles
            .iter()
            .filter(|a| !a.private && a.username == username)
            .cloned()
            .collect())
    }

    async fn get_articles_by(&self, username: &str) -> Result<Vec<Article>, RepoError> {
        let articles = self.articles.lock().unwrap();
        Ok(articles
            .iter()
            .filter(|a| a.username == username)
            .cloned()
            .collect())
    }

    async fn get_article(&self, id: Uuid) -> Result<Option<Article>, RepoError> {
        let articles = self.articles.lock().unwrap();
        Ok(articles.iter().find(|a| a.id == id).cloned())
    }

    async fn create_article(
        &self,
        username: &str,
        input: ArticleInput,
    ) -> Result<Article, RepoError> {
        let article = Article {
            id: Uuid::new_v4(),
            title: input.title,
            description: input.description,
            content: input.content,
            username: username.to_string(),
            private: input.private,
            created_at: Utc::now(),
        };
        self.articles.lock().unwrap().push(article.clone());
        Ok(article)
    }

    async fn update_article(
        &self,
        id: Uuid,
        username: &str,
        input: ArticleInput,
    ) -> Result<Option<Article>, RepoError> {
        let mut articles = self.articles.lock().unwrap();
        let Some(article) = articles
            .iter_mut()
            .find(|a| a.id == id && a.username == username)
        else {
            return Ok(None);
        };
        article.title = input.title;
        article.description = input.description;
        article.content = input.content;
        article.private = input.private;
        Ok(Some(article.clone()))
    }

    async fn delete_article(&self, id: Uuid, username: &str) -> Result<bool, RepoError> {
        let mut articles = self.articles.lock().unwrap();
        let before = articles.len();
        articles.retain(|a| !(a.id == id && a.username == username));
        Ok(articles.len() < before)
    }
}

// --- Helper Functions ---

pub fn test_config() -> AppConfig {
    AppConfig {
        jwt_secret: TEST_JWT_SECRET.to_string(),
        ..AppConfig::default()
    }
}

pub fn create_app_state(repo: MemoryRepo) -> AppState {
    AppState::new(Arc::new(repo), test_config())
}

pub fn article(username: &str, title: &str, private: bool) -> Article {
    Article {
        id: Uuid::new_v4(),
        title: title.to_string(),
        description: String::new(),
        content: format!("{title} body"),
        username: username.to_string(),
        private,
        created_at: Utc::now(),
    }
}
