pub mod handle;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use sps_shared::post::Post;

use crate::Error;

/// The static instance of posts.
pub static INSTANCE: Lazy<PostManager> = Lazy::new(PostManager::new);

#[must_use = "The save result should be handled"]
pub fn save_post(_post: &Post) -> bool {
    #[cfg(not(test))]
    {
        use std::{fs::File, io::Write};

        match File::create(format!("./data/posts/{}.toml", _post.id)) {
            Ok(mut file) => file
                .write_all(
                    match toml::to_string(_post) {
                        Ok(s) => s,
                        Err(_) => return false,
                    }
                    .as_bytes(),
                )
                .is_ok(),
            Err(_) => false,
        }
    }

    #[cfg(test)]
    true
}

#[must_use = "The deletion result should be handled"]
pub fn remove_post(_post: &Post) -> bool {
    #[cfg(not(test))]
    {
        return std::fs::remove_file(format!("./data/posts/{}.toml", _post.id)).is_ok();
    }

    #[cfg(test)]
    true
}

/// A simple post manager.
pub struct PostManager {
    pub posts: RwLock<Vec<RwLock<Post>>>,
}

impl PostManager {
    /// Read and create a post manager from `./data/posts`.
    fn new() -> Self {
        #[cfg(not(test))]
        {
            use std::{fs, io::Read};

            let _ = fs::create_dir_all("./data/posts");
            let mut vec = Vec::new();
            for dir in fs::read_dir("./data/posts").unwrap() {
                if let Ok(post) = dir.map(|e| {
                    toml::from_str::<Post>(&{
                        let mut string = String::new();
                        fs::File::open(e.path())
                            .unwrap()
                            .read_to_string(&mut string)
                            .unwrap();
                        string
                    })
                    .unwrap()
                }) {
                    vec.push(RwLock::new(post));
                }
            }
            return Self {
                posts: RwLock::new(vec),
            };
        }

        #[cfg(test)]
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }

    /// Push a post into this instance.
    pub fn push(&self, post: Post) {
        self.posts.write().push(RwLock::new(post))
    }

    /// Indicates if the target id is already contained in this instance.
    pub fn contains_id(&self, id: u64) -> bool {
        self.posts.read().iter().any(|post| post.read().id == id)
    }

    /// Run `f` against the target post.
    pub fn with_post<R>(&self, id: u64, f: impl FnOnce(&Post) -> R) -> Result<R, Error> {
        let posts = self.posts.read();
        for post in posts.iter() {
            let post = post.read();
            if post.id == id {
                return Ok(f(&post));
            }
        }
        Err(Error::PostNotFound(id))
    }

    /// Run `f` against the target post with write access. The post stays
    /// locked for the whole call, so a status change and whatever must
    /// pair with it commit together.
    pub fn with_post_mut<R>(&self, id: u64, f: impl FnOnce(&mut Post) -> R) -> Result<R, Error> {
        let posts = self.posts.read();
        for post in posts.iter() {
            if post.read().id == id {
                let mut post = post.write();
                return Ok(f(&mut post));
            }
        }
        Err(Error::PostNotFound(id))
    }

    /// Remove the target post, returning it.
    pub fn take(&self, id: u64) -> Option<Post> {
        let mut posts = self.posts.write();
        let index = posts.iter().position(|post| post.read().id == id)?;
        let removed = posts.remove(index).into_inner();
        if !remove_post(&removed) {
            tracing::error!("failed to remove post file for {}", removed.id);
        }
        Some(removed)
    }

    #[cfg(test)]
    pub fn reset(&self) {
        self.posts.write().clear();
    }
}

/// Generate a post id not yet contained in the manager.
pub fn new_post_id() -> u64 {
    use rand::Rng;

    loop {
        let id = rand::thread_rng().gen();
        if !INSTANCE.contains_id(id) {
            return id;
        }
    }
}
