use std::sync::Arc;

use crate::{
    form::{error::FormError, form_model::UploadForm},
    handler::{
        handler::{
            FormSubmissionHandler, SubmissionOptions, SubmissionOutcome, SubmissionTask,
            SubmitEvent,
        },
        regions::FormRegions,
    },
    trace::logger::TraceLogger,
    transport::transport::Transport,
};

/// A page hosting any number of independent upload forms.
///
/// Forms are registered explicitly with their regions; each gets its own
/// handler sharing only the transport, options and trace log.
pub struct UploadPage {
    transport: Arc<dyn Transport>,
    options: SubmissionOptions,
    tracer: Arc<TraceLogger>,
    handlers: Vec<FormSubmissionHandler>,
}

impl UploadPage {
    pub fn new(transport: Arc<dyn Transport>, options: SubmissionOptions) -> Self {
        Self {
            transport,
            options,
            tracer: Arc::new(TraceLogger::disabled()),
            handlers: vec![],
        }
    }

    pub fn with_tracer(mut self, tracer: Arc<TraceLogger>) -> Self {
        self.tracer = tracer;
        self
    }

    pub fn register(
        &mut self,
        form: UploadForm,
        regions: FormRegions,
    ) -> Result<&FormSubmissionHandler, FormError> {
        if self.handler(&form.id).is_some() {
            return Err(FormError::DuplicateForm(form.id));
        }

        let handler = FormSubmissionHandler::new(
            form,
            regions,
            Arc::clone(&self.transport),
            self.options.clone(),
        )
        .with_tracer(Arc::clone(&self.tracer));

        self.handlers.push(handler);
        Ok(&self.handlers[self.handlers.len() - 1])
    }

    pub fn handler(&self, form_id: &str) -> Option<&FormSubmissionHandler> {
        self.handlers.iter().find(|h| h.form_id() == form_id)
    }

    pub fn form_ids(&self) -> Vec<String> {
        self.handlers.iter().map(|h| h.form_id()).collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Submit a form by id. `None` when no such form is registered.
    pub fn submit(&self, form_id: &str) -> Option<SubmissionOutcome> {
        let mut event = SubmitEvent::new();
        self.handler(form_id).map(|h| h.submit(&mut event))
    }

    pub fn spawn_submit(&self, form_id: &str) -> Option<SubmissionTask> {
        let mut event = SubmitEvent::new();
        self.handler(form_id).map(|h| h.spawn_submit(&mut event))
    }
}
