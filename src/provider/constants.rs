pub mod openai {
    pub const API_BASE: &str = "https://api.openai.com/v1";
    pub const COMPLETIONS_ENDPOINT: &str = "/completions";
    pub const CHAT_COMPLETIONS_ENDPOINT: &str = "/chat/completions";
    pub const DEFAULT_MODEL: &str = "text-davinci-002";
    pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";
}

pub mod huggingface {
    pub const INFERENCE_API_BASE: &str = "https://api-inference.huggingface.co/models";
    pub const DEFAULT_MODEL: &str = "NovelAI/genji-python-6B";
    pub const API_KEY_ENV_VAR: &str = "HUGGINGFACE_API_KEY";
}
