//! Agents, topics and interaction actions offered by the tutoring backend.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AgentInfo {
    pub id: &'static str,
    pub label: &'static str,
}

pub const AGENTS: &[AgentInfo] = &[
    AgentInfo {
        id: "teacher_agent",
        label: "Teacher Agent",
    },
    AgentInfo {
        id: "student_agent_1",
        label: "Student Agent 1 (Alice)",
    },
    AgentInfo {
        id: "student_agent_2",
        label: "Student Agent 2 (Bob)",
    },
    AgentInfo {
        id: "multimodal_agent",
        label: "Multimodal Agent",
    },
];

pub const DEFAULT_AGENT: &str = "teacher_agent";
pub const MULTIMODAL_AGENT: &str = "multimodal_agent";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TopicInfo {
    pub id: &'static str,
    pub label: &'static str,
}

pub const TOPICS: &[TopicInfo] = &[
    TopicInfo {
        id: "photosynthesis",
        label: "Photosynthesis",
    },
    TopicInfo {
        id: "math_functions",
        label: "Math Functions",
    },
    TopicInfo {
        id: "world_history",
        label: "World History",
    },
];

pub fn find_agent(id: &str) -> Option<&'static AgentInfo> {
    AGENTS.iter().find(|agent| agent.id == id)
}

pub fn find_topic(id: &str) -> Option<&'static TopicInfo> {
    TOPICS.iter().find(|topic| topic.id == id)
}

/// Next agent in catalogue order, wrapping around.
pub fn next_agent(current: &str) -> &'static str {
    let index = AGENTS.iter().position(|agent| agent.id == current);
    match index {
        Some(i) => AGENTS[(i + 1) % AGENTS.len()].id,
        None => AGENTS[0].id,
    }
}

/// Cycles none -> first topic -> ... -> last topic -> none.
pub fn next_topic(current: Option<&str>) -> Option<&'static str> {
    let index = current.and_then(|id| TOPICS.iter().position(|topic| topic.id == id));
    match index {
        None => TOPICS.first().map(|topic| topic.id),
        Some(i) => TOPICS.get(i + 1).map(|topic| topic.id),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractAction {
    AskQuestion,
    AnswerQuestion,
    Discuss,
    RequestHelp,
}

impl InteractAction {
    pub const ALL: [InteractAction; 4] = [
        InteractAction::AskQuestion,
        InteractAction::AnswerQuestion,
        InteractAction::Discuss,
        InteractAction::RequestHelp,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            InteractAction::AskQuestion => "ask_question",
            InteractAction::AnswerQuestion => "answer_question",
            InteractAction::Discuss => "discuss",
            InteractAction::RequestHelp => "request_help",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.as_str() == raw.trim())
    }
}
