//! Diesel schema for session ledger persistence.

diesel::table! {
    /// Conversation sessions with denormalised last-turn fields.
    sessions (id) {
        /// Session identifier.
        id -> Uuid,
        /// Owning user.
        #[max_length = 255]
        user_id -> Varchar,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Latest write timestamp.
        updated_at -> Timestamptz,
        /// Agent invoked most recently.
        #[max_length = 100]
        last_agent_called -> Nullable<Varchar>,
        /// Query of the most recent invocation.
        last_query -> Nullable<Text>,
        /// Truncated reply of the most recent invocation.
        last_response_excerpt -> Nullable<Text>,
    }
}

diesel::table! {
    /// Append-only agent invocation audit trail.
    agent_invocations (id) {
        /// Append sequence.
        id -> Int8,
        /// Owning session.
        session_id -> Uuid,
        /// Invoked agent.
        #[max_length = 100]
        agent_name -> Varchar,
        /// Query sent to the agent.
        query -> Text,
        /// Truncated reply.
        response_excerpt -> Text,
        /// Whether the agent answered.
        success -> Bool,
        /// Call duration in milliseconds.
        duration_ms -> Int8,
        /// Completion timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Append-only conversation history.
    history (id) {
        /// Append sequence.
        id -> Int8,
        /// Owning session.
        session_id -> Uuid,
        /// Author role.
        #[max_length = 20]
        role -> Varchar,
        /// Message text.
        content -> Text,
        /// Append timestamp.
        created_at -> Timestamptz,
    }
}

diesel::joinable!(agent_invocations -> sessions (session_id));
diesel::joinable!(history -> sessions (session_id));
diesel::allow_tables_to_appear_in_same_query!(sessions, agent_invocations, history);
