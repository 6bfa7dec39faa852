//! Claim documents drafted by the language model.

status_enum!(
    /// Kind of document requested from the gateway.
    DocumentKind {
        Summary,
        SupplementRequest,
        HomeownerUpdate,
    }
);

impl DocumentKind {
    pub fn title(self) -> &'static str {
        match self {
            DocumentKind::Summary => "Claim summary",
            DocumentKind::SupplementRequest => "Supplement request",
            DocumentKind::HomeownerUpdate => "Homeowner update",
        }
    }

    /// What the model is asked to write for this kind.
    pub fn instructions(self) -> &'static str {
        match self {
            DocumentKind::Summary => {
                "Write a concise internal summary of the claim: loss, carrier position, \
                 estimate totals and open items. Use short paragraphs."
            }
            DocumentKind::SupplementRequest => {
                "Write a formal supplement request addressed to the insurance carrier's \
                 adjuster. Reference the claim number, list the items missing from the \
                 carrier scope and request a revised estimate."
            }
            DocumentKind::HomeownerUpdate => {
                "Write a friendly status update for the homeowner in plain language. \
                 Explain where the claim stands and the next step. Avoid insurance jargon."
            }
        }
    }
}
