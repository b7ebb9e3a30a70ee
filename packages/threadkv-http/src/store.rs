use threadkv_core::{ChildId, Node, NodeStore, ParentRef, Result, RootId, RootSummary};

use crate::api::{BoardApi, ReplyTree, TopicSummary};
use crate::config::Config;

/// [`NodeStore`] over the board REST API. Token handling lives in the wire
/// client; this type only maps the contract onto endpoints.
///
/// The backend's title search is approximate: it can return fuzzy matches
/// and can miss an exact one, in which case the engine sees the key as
/// absent. The engine filters candidates for exact equality itself, so this
/// adapter passes search results through untouched.
pub struct HttpNodeStore {
    api: BoardApi,
}

impl HttpNodeStore {
    pub fn new(config: Config) -> Result<Self> {
        Ok(Self {
            api: BoardApi::new(config)?,
        })
    }
}

fn to_node(reply: ReplyTree) -> Node {
    Node {
        id: ChildId::new(reply.id),
        text: reply.text,
        children: reply.replies.into_iter().map(to_node).collect(),
    }
}

fn to_summary(topic: TopicSummary) -> RootSummary {
    RootSummary {
        id: RootId::new(topic.id),
        title: topic.title,
    }
}

impl NodeStore for HttpNodeStore {
    fn create_root(&mut self, namespace: &str, title: &str, body: &str) -> Result<RootId> {
        let created = self.api.create_topic(namespace, title, body)?;
        Ok(RootId::new(created.id))
    }

    fn attach_child(&mut self, parent: &ParentRef, text: &str) -> Result<ChildId> {
        let created = match parent {
            ParentRef::Root(root) => self.api.create_topic_reply(root.as_str(), text)?,
            ParentRef::Child(child) => self.api.create_reply_reply(child.as_str(), text)?,
        };
        Ok(ChildId::new(created.id))
    }

    fn delete_root(&mut self, root: &RootId) -> Result<()> {
        self.api.delete_topic(root.as_str())
    }

    fn replies(&self, root: &RootId) -> Result<Vec<Node>> {
        let replies = self.api.topic_replies(root.as_str())?;
        Ok(replies.into_iter().map(to_node).collect())
    }

    fn list_roots(&self, namespace: &str, limit: usize) -> Result<Vec<RootSummary>> {
        let topics = self.api.list_topics(namespace, limit)?;
        Ok(topics.into_iter().map(to_summary).collect())
    }

    fn search_roots(&self, namespace: &str, query: &str) -> Result<Vec<RootSummary>> {
        let topics = self.api.search_topics(namespace, query)?;
        Ok(topics.into_iter().map(to_summary).collect())
    }
}
