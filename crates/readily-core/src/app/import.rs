impl<S, IN> ReaderApp<S, IN>
where
    S: Scheduler,
    IN: InputProvider,
{
    /// Classifies the file and issues a ticket superseding any import still
    /// in flight. Unsupported types are rejected before extraction.
    pub fn begin_import(
        &mut self,
        file_name: &str,
        mime: Option<&str>,
    ) -> Result<ImportTicket, ReaderError> {
        let kind = match DocumentKind::detect(file_name, mime) {
            Ok(kind) => kind,
            Err(err) => {
                warn!("import: rejected name={:?} err={}", file_name, err);
                self.set_notice(&err);
                return Err(err);
            }
        };

        self.import_generation = self.import_generation.wrapping_add(1);
        let ticket = ImportTicket {
            generation: self.import_generation,
            kind,
        };
        if let Some(previous) = self.pending_import.as_ref() {
            debug!(
                "import: superseding generation={}",
                previous.ticket.generation
            );
        }
        self.pending_import = Some(PendingImport {
            ticket,
            title: document_title(file_name),
        });
        info!(
            "import: begin generation={} kind={} name={:?}",
            ticket.generation,
            kind.label(),
            file_name
        );
        Ok(ticket)
    }

    /// Threshold used by extraction workers for this session.
    pub fn min_extracted_chars(&self) -> usize {
        self.config.min_extracted_chars
    }

    /// Applies an extraction result. Stale tickets are discarded; failures
    /// keep the current tokens, position and playback state.
    pub fn complete_import(
        &mut self,
        ticket: ImportTicket,
        result: Result<Vec<Fragment>, ReaderError>,
    ) -> Result<ImportOutcome, ReaderError> {
        let is_current = self
            .pending_import
            .as_ref()
            .is_some_and(|pending| pending.ticket == ticket);
        if !is_current {
            debug!("import: discard stale generation={}", ticket.generation);
            return Ok(ImportOutcome::Superseded);
        }
        let Some(pending) = self.pending_import.take() else {
            return Ok(ImportOutcome::Superseded);
        };

        let fragments = match result {
            Ok(fragments) => fragments,
            Err(err) => {
                warn!(
                    "import: failed generation={} err={}",
                    ticket.generation, err
                );
                self.set_notice(&err);
                return Err(err);
            }
        };

        self.tokens = TokenSequence::from_fragments(&fragments);
        self.search = None;
        self.title = pending.title;
        self.notice = None;
        self.document_loaded = true;
        self.text_generation = self.text_generation.wrapping_add(1);
        self.with_playback(|engine, ctx| engine.seek(0, ctx));
        self.pending_redraw = true;

        info!(
            "import: loaded generation={} words={}",
            ticket.generation,
            self.tokens.len()
        );
        Ok(ImportOutcome::Loaded {
            words: self.tokens.len(),
        })
    }

    /// Begin, extract and complete in one call.
    pub fn import_document(
        &mut self,
        bytes: &[u8],
        file_name: &str,
        mime: Option<&str>,
    ) -> Result<ImportOutcome, ReaderError> {
        let ticket = self.begin_import(file_name, mime)?;
        let result =
            content::extract_with_threshold(bytes, ticket.kind(), self.config.min_extracted_chars);
        self.complete_import(ticket, result)
    }
}

/// File name without directories or extension.
fn document_title(file_name: &str) -> String {
    let base = file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };
    stem.to_owned()
}
